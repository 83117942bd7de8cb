fn main() -> std::process::ExitCode {
    screen_assist_lib::run()
}
