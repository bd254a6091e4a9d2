use std::io::Read;
use std::path::Path;

use interpose_core::CapabilitySurface;

use super::CliError;

/// Read a surface from a JSON file, or stdin for `-`.
pub fn load_surface(path: &Path) -> Result<CapabilitySurface, CliError> {
    let read_error = |source| CliError::Read {
        path: path.to_path_buf(),
        source,
    };

    let json = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).map_err(read_error)?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(read_error)?
    };

    CapabilitySurface::from_json(&json).map_err(|source| CliError::Surface {
        path: path.to_path_buf(),
        source,
    })
}
