//! Session packages: a ZIP archive of pages, media and a JSON manifest

mod archive;
mod manifest;

pub use archive::{
    export_package, import_package, read_package, write_package, ImportedPackage, MANIFEST_NAME,
};
pub use manifest::{PackageManifest, MANIFEST_VERSION};
