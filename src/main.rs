use gitsketch::ui::output;

fn main() {
    if let Err(err) = gitsketch::cli::run() {
        output::error(format!("{:#}", err));
        std::process::exit(1);
    }
}
