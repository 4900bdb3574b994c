/// Platforms a release can ship an archive for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux64,
    Windows64,
    Windows32,
    WebGl,
}

/// Asset name prefixes, in match order. `windows-x86_64` must be
/// checked before `windows-x86` since the latter is a prefix of it.
const ASSET_PREFIXES: [(&str, Platform); 4] = [
    ("linux-x86_64", Platform::Linux64),
    ("windows-x86_64", Platform::Windows64),
    ("windows-x86", Platform::Windows32),
    ("webgl", Platform::WebGl),
];

impl Platform {
    /// Find which platform an asset belongs to from its file name
    pub fn from_asset_name(name: &str) -> Option<Self> {
        ASSET_PREFIXES
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix))
            .map(|(_, platform)| *platform)
    }
}

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
pub fn current_platform() -> Option<Platform> {
    Some(Platform::Linux64)
}

#[cfg(all(target_os = "windows", target_pointer_width = "64"))]
pub fn current_platform() -> Option<Platform> {
    Some(Platform::Windows64)
}

#[cfg(all(target_os = "windows", target_pointer_width = "32"))]
pub fn current_platform() -> Option<Platform> {
    Some(Platform::Windows32)
}

#[cfg(not(any(
    all(target_os = "linux", target_arch = "x86_64"),
    target_os = "windows"
)))]
pub fn current_platform() -> Option<Platform> {
    None
}

#[cfg(target_os = "windows")]
pub fn os_exec_name(app_name: &str) -> String {
    format!("{}.exe", app_name)
}

#[cfg(not(target_os = "windows"))]
pub fn os_exec_name(app_name: &str) -> String {
    app_name.to_string()
}
