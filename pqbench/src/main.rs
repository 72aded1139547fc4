fn main() {
    if let Err(e) = pqbench::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
