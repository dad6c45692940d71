//! Atomic whole-file replacement.
//!
//! New content is written to a uniquely named temporary file in the same
//! directory as the target, flushed to disk, then renamed over the target.
//! A concurrent reader therefore sees either the complete old file or the
//! complete new one, never a partial write. Concurrent writers each get
//! their own temporary file, so the last rename wins with a whole payload.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::{StoreError, StoreResult};

/// Replace `target` with `bytes`. Returns the number of bytes written.
pub fn replace(target: &Path, bytes: &[u8]) -> StoreResult<u64> {
    replace_with(target, |file| file.write_all(bytes))?;
    Ok(bytes.len() as u64)
}

/// Replace `target` with whatever `write` puts into the temporary file.
///
/// The parent directory must already exist.
pub fn replace_with<F>(target: &Path, write: F) -> StoreResult<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let write_failure = |source: io::Error| StoreError::WriteFailure {
        path: target.to_path_buf(),
        source,
    };

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = match target.file_name() {
        Some(name) => format!(".{}.", name.to_string_lossy()),
        None => ".replace.".to_string(),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_failure)?;

    write(tmp.as_file_mut()).map_err(write_failure)?;
    tmp.as_file().sync_all().map_err(write_failure)?;

    // On failure the temporary file is removed when `PersistError` drops.
    tmp.persist(target).map_err(|e| write_failure(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn replace_creates_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("doc.json");

        assert_eq!(replace(&target, b"first").unwrap(), 5);
        assert_eq!(fs::read(&target).unwrap(), b"first");

        assert_eq!(replace(&target, b"2nd").unwrap(), 3);
        assert_eq!(fs::read(&target).unwrap(), b"2nd");
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("doc.json");
        replace(&target, b"{}").unwrap();
        replace(&target, b"{}").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("doc.json")]);
    }

    #[test]
    fn failed_writer_keeps_old_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("doc.json");
        replace(&target, b"old").unwrap();

        let err = replace_with(&target, |file| {
            file.write_all(b"partial")?;
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        })
        .unwrap_err();

        assert!(matches!(err, StoreError::WriteFailure { .. }));
        assert_eq!(fs::read(&target).unwrap(), b"old");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_directory_is_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("doc.json");
        let err = replace(&target, b"x").unwrap_err();
        assert!(matches!(err, StoreError::WriteFailure { .. }));
    }

    #[test]
    fn slow_and_fast_writers_never_mix() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("doc.json");

        let old = vec![b'o'; 4096];
        let slow = vec![b's'; 4096];
        let fast = vec![b'f'; 4096];
        replace(&target, &old).unwrap();

        let done = AtomicBool::new(false);
        let start = Barrier::new(3);

        thread::scope(|s| {
            s.spawn(|| {
                start.wait();
                replace_with(&target, |file| {
                    for chunk in slow.chunks(256) {
                        file.write_all(chunk)?;
                        file.flush()?;
                        thread::sleep(Duration::from_millis(2));
                    }
                    Ok(())
                })
                .unwrap();
            });

            s.spawn(|| {
                start.wait();
                thread::sleep(Duration::from_millis(5));
                replace(&target, &fast).unwrap();
            });

            let reader = s.spawn(|| {
                start.wait();
                let mut reads = 0;
                while !done.load(Ordering::Acquire) {
                    let seen = fs::read(&target).unwrap();
                    assert!(
                        seen == old || seen == slow || seen == fast,
                        "observed a mixed or partial file of {} bytes",
                        seen.len()
                    );
                    reads += 1;
                }
                reads
            });

            thread::sleep(Duration::from_millis(100));
            done.store(true, Ordering::Release);
            assert!(reader.join().unwrap() > 0);
        });

        let last = fs::read(&target).unwrap();
        assert!(last == slow || last == fast);
    }
}
