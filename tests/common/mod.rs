use discregrid::cli;
use lazy_static::lazy_static;
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

#[macro_export]
macro_rules! path_str {
    ($path:expr) => {
        $path.to_string_lossy().as_ref()
    };
}

lazy_static! {
    static ref COMMAND: clap::Command<'static> = cli::build::build().no_binary_name(true);
}

/// Closed unit cube [0, 1]^3 with outward facing quads.
const UNIT_CUBE_OBJ: &str = "\
# unit cube
o cube
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
v 0 0 1
v 1 0 1
v 0 1 1
v 1 1 1
f 1 3 4 2
f 5 6 8 7
f 1 2 6 5
f 3 7 8 4
f 1 5 7 3
f 2 4 8 6
";

pub fn run<I, T>(args: I)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    cli::run::run_with_args(COMMAND.clone().get_matches_from(args));
}

pub fn write_unit_cube_obj<P: AsRef<Path>>(dir: P) -> PathBuf {
    let file_path = dir.as_ref().join("cube.obj");
    fs::write(&file_path, UNIT_CUBE_OBJ).unwrap();
    file_path
}

pub fn assert_file_exists<P: AsRef<Path>>(file_path: P) {
    let file_path = file_path.as_ref();
    assert!(
        file_path.exists(),
        "File {} does not exist",
        file_path.to_string_lossy()
    );
}
