fn main() -> anyhow::Result<()> {
    hearth::app::run()
}
