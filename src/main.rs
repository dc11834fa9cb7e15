fn main() {
    if let Err(e) = dataset_ingest_lib::app::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
