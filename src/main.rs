fn main() -> anyhow::Result<()> {
    movecoach_lib::run()
}
