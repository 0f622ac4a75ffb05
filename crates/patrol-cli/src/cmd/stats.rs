use crate::output::print_json;
use anyhow::Context;
use patrol_core::app::App;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let app = App::open(root).context("failed to open patrol root")?;
    let view = app.render_summary();

    if json {
        print_json(&view)?;
    } else {
        print!("{view}");
    }
    Ok(())
}
