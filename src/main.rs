use fluid_engine::run;

fn main() -> anyhow::Result<()> {
    run()
}
