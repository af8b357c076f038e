use std::env;

/// `cargo xtask bundle multi_filter --release [--target <triple>]`
///
/// A `--target` is consumed here and turned into a per-target build directory, everything else is
/// forwarded to `nih_plug_xtask`.
fn main() -> nih_plug_xtask::Result<()> {
    let mut args: Vec<String> = env::args().collect();

    if let Some(pos) = args.iter().position(|arg| arg == "--target") {
        if let Some(target) = args.get(pos + 1).cloned() {
            args.drain(pos..=pos + 1);
            env::set_var("CARGO_TARGET_DIR", format!("target/{target}"));
        }
    }

    nih_plug_xtask::main_with_args("cargo xtask", args.into_iter().skip(1))
}
