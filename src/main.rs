fn main() -> Result<(), eframe::Error> {
    // Set up logging for development
    env_logger::init();

    // Optional backend URL override as the first argument
    let base_url = std::env::args().nth(1);

    zone_console::run_app(base_url)
}
