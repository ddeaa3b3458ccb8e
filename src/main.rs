fn main() {
    motion_pipeline::cli::run();
}
