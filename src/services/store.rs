//! CSV 文件覆盖写入
//!
//! 先写入同目录下的临时文件，再原子重命名覆盖目标文件，
//! 并发读取只会看到旧文件或新文件

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

fn write_atomic(path: &Path, body: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("创建目录 {} 失败", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("写入 {} 失败", path.display()))?;
    Ok(())
}

/// 用请求体覆盖 CSV 文件
pub async fn write_csv(path: &Path, body: String) -> Result<()> {
    let target = path.to_path_buf();
    let len = body.len();

    tokio::task::spawn_blocking(move || write_atomic(&target, body.as_bytes())).await??;

    log::info!("已覆盖 {}（{} 字节）", path.display(), len);
    Ok(())
}
