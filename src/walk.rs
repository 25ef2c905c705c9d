//! Corpus walker: discover record files and feed them to the assembler in
//! parallel.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::stream::{self, StreamExt};
use walkdir::WalkDir;

use crate::assemble::{Assembler, IngestOutcome};
use crate::error::{GraphError, Result};

/// How paths given on the command line are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkMode {
    /// A Who's On First repository; records live under `<path>/data`.
    #[default]
    Repo,
}

impl WalkMode {
    /// Directory actually walked for a given input path.
    pub fn data_root(&self, path: &Path) -> PathBuf {
        match self {
            WalkMode::Repo => path.join("data"),
        }
    }
}

impl FromStr for WalkMode {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "repo" => Ok(WalkMode::Repo),
            other => Err(GraphError::Config(format!(
                "Only '--mode repo' is supported right now, got '{}'",
                other
            ))),
        }
    }
}

/// Counters collected over a walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub files: usize,
    pub added: usize,
    pub skipped: usize,
    pub filtered: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// Find every `.geojson` file under `root`, principal or not.
pub fn discover_records(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let is_geojson = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("geojson"))
            .unwrap_or(false);

        if is_geojson {
            files.push(path.to_path_buf());
        }
    }

    // Stable order for logs; the graph itself does not depend on it.
    files.sort();
    log::info!("Discovered {} files in {}", files.len(), root.display());
    Ok(files)
}

/// Walk every input path and ingest each record file.
///
/// Up to `workers` files are ingested at once on the blocking thread pool.
/// With `fail_fast`, the first ingest error stops the walk and is returned;
/// otherwise errors are logged and counted.
pub async fn index_paths(
    assembler: Arc<Assembler>,
    paths: &[PathBuf],
    mode: WalkMode,
    workers: usize,
    fail_fast: bool,
) -> Result<WalkStats> {
    let start = Instant::now();
    let mut stats = WalkStats::default();

    for path in paths {
        let root = mode.data_root(path);
        if !root.is_dir() {
            return Err(GraphError::Walk(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let files = discover_records(&root)?;
        stats.files += files.len();

        let mut results = stream::iter(files)
            .map(|file| {
                let assembler = Arc::clone(&assembler);
                async move {
                    let task_file = file.clone();
                    let joined =
                        tokio::task::spawn_blocking(move || assembler.ingest_file(&task_file)).await;
                    (file, joined)
                }
            })
            .buffer_unordered(workers.max(1));

        while let Some((file, joined)) = results.next().await {
            let outcome = joined.map_err(|e| {
                GraphError::Walk(format!("worker failed on {}: {}", file.display(), e))
            })?;

            match outcome {
                Ok(IngestOutcome::Added) => stats.added += 1,
                Ok(IngestOutcome::Skipped) => stats.skipped += 1,
                Ok(IngestOutcome::Filtered) => stats.filtered += 1,
                Err(e) => {
                    stats.failed += 1;
                    if fail_fast {
                        return Err(e);
                    }
                    log::error!("✗ {}: {}", file.display(), e);
                }
            }
        }
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterPolicy;
    use crate::graph::GraphAccumulator;
    use crate::label::Labeler;
    use crate::record::uri::id_to_rel_path;
    use crate::resolve::RelationOptions;
    use crate::store::FsStore;
    use std::fs;
    use tempfile::TempDir;

    fn write_record(data: &Path, id: i64, parent_id: i64) {
        let path = data.join(id_to_rel_path(id).unwrap());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let body = format!(
            r#"{{"type":"Feature","properties":{{"wof:id":{},"wof:parent_id":{},"wof:name":"p{}","wof:placetype":"region"}}}}"#,
            id, parent_id, id
        );
        fs::write(path, body).unwrap();
    }

    fn assembler_for(data: &Path) -> Arc<Assembler> {
        Arc::new(Assembler::new(
            Arc::new(FsStore::new(data)),
            FilterPolicy::default(),
            Labeler::new(false),
            RelationOptions::default(),
            Arc::new(GraphAccumulator::new()),
        ))
    }

    #[test]
    fn test_walk_mode_parse() {
        assert_eq!("repo".parse::<WalkMode>().unwrap(), WalkMode::Repo);
        let err = "directory".parse::<WalkMode>().unwrap_err();
        assert!(matches!(err, GraphError::Config(_)));
    }

    #[test]
    fn test_discover_records() {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("data");
        write_record(&data, 1, 0);
        write_record(&data, 1234, 1);
        fs::write(data.join("README.md"), "# data").unwrap();
        fs::write(data.join("1-alt-foo.geojson"), "{}").unwrap();

        let files = discover_records(&data).unwrap();
        assert_eq!(files.len(), 3);
        assert!(!files.iter().any(|f| f.ends_with("README.md")));
    }

    #[tokio::test]
    async fn test_index_repo() {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("data");
        write_record(&data, 1, 0);
        write_record(&data, 2, 1);
        write_record(&data, 3, 1);
        fs::write(data.join("2-alt-foo.geojson"), "{}").unwrap();

        let assembler = assembler_for(&data);
        let stats = index_paths(
            Arc::clone(&assembler),
            &[temp_dir.path().to_path_buf()],
            WalkMode::Repo,
            4,
            true,
        )
        .await
        .unwrap();

        assert_eq!(stats.files, 4);
        assert_eq!(stats.added, 3);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.failed, 0);

        let graph = assembler.graph().snapshot();
        assert_eq!(graph.node_count(), 3);
        assert!(graph.contains_edge("p2, region / 2", "p1, region / 1"));
        assert!(graph.contains_edge("p3, region / 3", "p1, region / 1"));
    }

    #[tokio::test]
    async fn test_index_fail_fast_vs_keep_going() {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("data");
        write_record(&data, 1, 0);
        fs::write(data.join("5.geojson"), "not json").unwrap();

        let paths = [temp_dir.path().to_path_buf()];

        let result = index_paths(assembler_for(&data), &paths, WalkMode::Repo, 2, true).await;
        assert!(matches!(result, Err(GraphError::Decode { .. })));

        let stats = index_paths(assembler_for(&data), &paths, WalkMode::Repo, 2, false)
            .await
            .unwrap();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.added, 1);
    }

    #[tokio::test]
    async fn test_index_missing_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let result = index_paths(
            assembler_for(temp_dir.path()),
            &[temp_dir.path().to_path_buf()],
            WalkMode::Repo,
            1,
            true,
        )
        .await;
        assert!(matches!(result, Err(GraphError::Walk(_))));
    }
}
