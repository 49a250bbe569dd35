fn main() {
    if let Err(e) = beat_flash::run() {
        log::error!("{}", e);
        eprintln!("beat-flash: {}", e);
        std::process::exit(1);
    }
}
