fn main() -> Result<(), Box<dyn std::error::Error>> {
    modex_cli::run()
}
