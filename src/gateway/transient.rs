//! # 暂存文件守卫
//!
//! ## 设计思路
//!
//! 每个请求的上传文件与合成产物都落在唯一路径上（`uuid` 命名），
//! 并由 `TransientFile` 以 RAII 方式持有：离开作用域即删除，
//! 无论流程是成功返回、提前 `?` 返回还是 panic 展开。
//!
//! 仅当 `retain_transient_files` 打开时保留文件，便于排查。

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::GatewayError;

/// 暂存文件的 RAII 守卫。
#[derive(Debug)]
pub(crate) struct TransientFile {
    path: PathBuf,
    retain: bool,
}

impl TransientFile {
    /// 在 `dir` 下以唯一文件名写入 `bytes` 并返回守卫。
    pub(crate) fn write(
        dir: &Path,
        extension: &str,
        bytes: &[u8],
        retain: bool,
    ) -> Result<Self, GatewayError> {
        fs::create_dir_all(dir)
            .map_err(|e| GatewayError::FileSystem(format!("创建暂存目录失败：{}", e)))?;

        let path = dir.join(format!("upload-{}.{}", Uuid::new_v4(), extension));
        // 先建守卫，写入中途失败时半截文件也会被清理
        let guard = Self { path, retain };
        fs::write(&guard.path, bytes)
            .map_err(|e| GatewayError::FileSystem(format!("写入暂存文件失败：{}", e)))?;

        log::debug!("📝 已写入暂存文件 - {} ({} bytes)", guard.path.display(), bytes.len());
        Ok(guard)
    }

    /// 接管一个已存在的文件（例如合成产物），守卫结束时删除。
    pub(crate) fn adopt(path: PathBuf, retain: bool) -> Self {
        Self { path, retain }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TransientFile {
    fn drop(&mut self) {
        if self.retain {
            log::debug!("📌 保留暂存文件 - {}", self.path.display());
            return;
        }

        match fs::remove_file(&self.path) {
            Ok(()) => log::debug!("🧹 已清理暂存文件 - {}", self.path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => log::warn!("⚠️ 清理暂存文件失败 - {}: {}", self.path.display(), err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("frame-editor-transient-{}-{}", tag, Uuid::new_v4()))
    }

    #[test]
    fn file_is_removed_when_guard_drops() {
        let dir = scratch_dir("drop");
        let path = {
            let guard = TransientFile::write(&dir, "png", b"abc", false).expect("write transient");
            assert!(guard.path().exists());
            guard.path().to_path_buf()
        };

        assert!(!path.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn retained_file_survives_drop() {
        let dir = scratch_dir("retain");
        let path = {
            let guard = TransientFile::write(&dir, "png", b"abc", true).expect("write transient");
            guard.path().to_path_buf()
        };

        assert!(path.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn each_write_gets_a_unique_path() {
        let dir = scratch_dir("unique");
        let first = TransientFile::write(&dir, "png", b"a", false).expect("write first");
        let second = TransientFile::write(&dir, "png", b"b", false).expect("write second");

        assert_ne!(first.path(), second.path());
        drop(first);
        drop(second);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn adopted_missing_file_drops_quietly() {
        let dir = scratch_dir("adopt");
        let guard = TransientFile::adopt(dir.join("never-written.png"), false);
        drop(guard);
    }
}
