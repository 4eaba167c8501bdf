use std::io;
use std::path::Path;

use upkeep_backend::FileSystem;

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }

    fn delete_directory(&self, path: &Path) -> io::Result<()> {
        let metadata = match path.symlink_metadata() {
            Ok(metadata) => metadata,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(error) => return Err(error),
        };

        if metadata.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        }
    }

    fn create_directory(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn copy_directory(&self, source: &Path, dest_into: &Path) -> io::Result<()> {
        let name = source.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no final component", source.display()),
            )
        })?;
        std::fs::create_dir_all(dest_into)?;
        copy_entry(source, &dest_into.join(name))
    }
}

fn copy_entry(src: &Path, dest: &Path) -> io::Result<()> {
    let file_type = src.symlink_metadata()?.file_type();

    if file_type.is_symlink() {
        copy_symlink(src, dest)
    } else if file_type.is_dir() {
        std::fs::create_dir_all(dest)?;
        for entry in std::fs::read_dir(src)? {
            let entry = entry?;
            copy_entry(&entry.path(), &dest.join(entry.file_name()))?;
        }
        Ok(())
    } else {
        std::fs::copy(src, dest).map(|_| ()).map_err(|error| {
            io::Error::new(
                error.kind(),
                format!("{} -> {}: {error}", src.display(), dest.display()),
            )
        })
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> io::Result<()> {
    let target = std::fs::read_link(src)?;
    std::os::unix::fs::symlink(target, dest)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dest: &Path) -> io::Result<()> {
    if src.is_dir() {
        std::fs::create_dir_all(dest)?;
        for entry in std::fs::read_dir(src)? {
            let entry = entry?;
            copy_entry(&entry.path(), &dest.join(entry.file_name()))?;
        }
        Ok(())
    } else {
        std::fs::copy(src, dest).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_directory_places_source_under_destination() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let source = temp.path().join("node_modules");
        std::fs::create_dir_all(source.join("pkg/lib")).expect("source tree");
        std::fs::write(source.join("pkg/lib/index.js"), b"module.exports = 1;")
            .expect("source file");
        let dest = temp.path().join("backup");

        LocalFileSystem
            .copy_directory(&source, &dest)
            .expect("copy succeeds");

        let copied = std::fs::read(dest.join("node_modules/pkg/lib/index.js"))
            .expect("copied file should exist");
        assert_eq!(copied, b"module.exports = 1;");
    }

    #[test]
    fn delete_directory_ignores_missing_paths() {
        let temp = tempfile::tempdir().expect("tempdir should be created");

        LocalFileSystem
            .delete_directory(&temp.path().join("missing"))
            .expect("missing path is not an error");
    }

    #[test]
    fn delete_directory_removes_nested_tree() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let dir = temp.path().join("platforms");
        std::fs::create_dir_all(dir.join("android/app")).expect("tree");
        std::fs::write(dir.join("android/app/build.gradle"), b"").expect("file");

        LocalFileSystem.delete_directory(&dir).expect("delete succeeds");

        assert!(!LocalFileSystem.exists(&dir));
    }

    #[cfg(unix)]
    #[test]
    fn copy_directory_preserves_symlinks() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let source = temp.path().join("node_modules");
        std::fs::create_dir_all(source.join(".bin")).expect("bin dir");
        std::fs::write(source.join("tool.js"), b"").expect("tool");
        std::os::unix::fs::symlink("../tool.js", source.join(".bin/tool")).expect("symlink");
        let dest = temp.path().join("backup");

        LocalFileSystem
            .copy_directory(&source, &dest)
            .expect("copy succeeds");

        let link = std::fs::read_link(dest.join("node_modules/.bin/tool"))
            .expect("copied entry should be a symlink");
        assert_eq!(link, std::path::PathBuf::from("../tool.js"));
    }
}
