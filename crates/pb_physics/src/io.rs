// crates/pb_physics/src/io.rs

//! 组分数场的持久化
//!
//! 每个组一个 JSON 文件 `f.<phase>.group<i>.json`，内容为
//! `{name, phase, time, values}`。写入先落到临时文件再重命名，
//! 中途失败不会留下截断的文件。

use pb_foundation::{PbError, PbResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::field::ScalarField;
use crate::group::SizeGroup;

/// 单个组分数场的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupFieldRecord {
    pub name: String,
    pub phase: String,
    pub time: f64,
    pub values: Vec<f64>,
}

/// 组分数场文件路径
pub fn group_field_path(dir: &Path, group: &SizeGroup) -> PathBuf {
    dir.join(format!("{}.json", group.field_name()))
}

/// 写出全部组分数场，返回写出的文件
pub fn write_group_fields(groups: &[SizeGroup], dir: &Path, time: f64) -> PbResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .map_err(|e| PbError::io_with_source(format!("创建目录 {} 失败", dir.display()), e))?;

    let mut written = Vec::with_capacity(groups.len());
    for group in groups {
        let record = GroupFieldRecord {
            name: group.field_name(),
            phase: group.phase.clone(),
            time,
            values: group.f.as_slice().to_vec(),
        };
        let content = serde_json::to_string_pretty(&record)
            .map_err(|e| PbError::serialization(format!("{}: {}", record.name, e)))?;

        let path = group_field_path(dir, group);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .map_err(|e| PbError::io_with_source(format!("写入 {} 失败", tmp.display()), e))?;
        fs::rename(&tmp, &path)
            .map_err(|e| PbError::io_with_source(format!("重命名到 {} 失败", path.display()), e))?;
        written.push(path);
    }
    log::debug!("写出 {} 个组分数场到 {} (t = {})", written.len(), dir.display(), time);
    Ok(written)
}

/// 读入全部组分数场（同时作为时间步起点），返回记录中的时间
pub fn read_group_fields(groups: &mut [SizeGroup], dir: &Path) -> PbResult<f64> {
    let mut time = 0.0;
    for group in groups.iter_mut() {
        let path = group_field_path(dir, group);
        if !path.exists() {
            return Err(PbError::file_not_found(path));
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| PbError::io_with_source(format!("读取 {} 失败", path.display()), e))?;
        let record: GroupFieldRecord = serde_json::from_str(&content)
            .map_err(|e| PbError::serialization(format!("{}: {}", path.display(), e)))?;
        PbError::check_size(&record.name, group.f.len(), record.values.len())?;

        group.f = ScalarField::from_vec(record.values);
        group.f0 = group.f.clone();
        time = record.time;
    }
    Ok(time)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(n_cells: usize) -> Vec<SizeGroup> {
        vec![
            SizeGroup::new(0, "air", 0, 1e-3, ScalarField::uniform(n_cells, 0.3)),
            SizeGroup::new(1, "air", 0, 2e-3, ScalarField::uniform(n_cells, 0.7)),
        ]
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut original = groups(4);
        original[1].f[2] = 0.9;
        let files = write_group_fields(&original, dir.path(), 0.25).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("f.air.group0.json"));
        assert!(!dir.path().join("f.air.group0.json.tmp").exists());

        let mut restored = groups(4);
        let time = read_group_fields(&mut restored, dir.path()).unwrap();
        assert_eq!(time, 0.25);
        assert_eq!(restored[1].f[2], 0.9);
        assert_eq!(restored[1].f0[2], 0.9);
    }

    #[test]
    fn test_cell_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        write_group_fields(&groups(4), dir.path(), 0.0).unwrap();
        let err = read_group_fields(&mut groups(3), dir.path()).unwrap_err();
        assert!(matches!(err, PbError::SizeMismatch { .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_group_fields(&mut groups(1), dir.path()).unwrap_err();
        assert!(matches!(err, PbError::FileNotFound { .. }));
    }
}
