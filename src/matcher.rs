//! Ranked path matches for the picker.
//!
//! The session only talks to [`MatchEngine`]. [`NucleoEngine`] scans the
//! current directory on a background thread, fuzzy-matches with nucleo and
//! re-ranks with the session's score rules. It never blocks the caller:
//! partial results are returned with `in_progress` set and the waker fires
//! when more are ready.

use crate::file_scanner::{self, ScanOptions, ScannedEntry};
use crate::score_rules::ScoreRules;
use nucleo::{
    Config, Matcher, Nucleo,
    pattern::{CaseMatching, Normalization},
};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Called from worker threads whenever new results may be available.
pub type Waker = Arc<dyn Fn() + Send + Sync>;

const TICK_TIMEOUT_MS: u64 = 10;
const WAKE_EVERY_ENTRIES: usize = 512;

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub display_text: String,
    pub abspath: PathBuf,
    pub is_dir: bool,
    pub score: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct MatchQuery<'a> {
    pub search_text: &'a str,
    pub current_dir: &'a Path,
    pub only_dirs: bool,
    pub score_rules: &'a ScoreRules,
}

#[derive(Debug, Clone)]
pub struct MatchResults {
    /// Best first.
    pub matches: Arc<[Match]>,
    pub in_progress: bool,
}

impl MatchResults {
    pub fn new(matches: Vec<Match>, in_progress: bool) -> Self {
        MatchResults {
            matches: matches.into(),
            in_progress,
        }
    }
}

pub trait MatchEngine {
    /// Current ranked results for `query`. Cheap enough to call on every render.
    fn results(&mut self, query: &MatchQuery<'_>) -> MatchResults;
}

#[derive(Debug)]
struct Candidate {
    display_text: String,
    abspath: PathBuf,
    is_dir: bool,
}

impl From<ScannedEntry> for Candidate {
    fn from(entry: ScannedEntry) -> Self {
        Candidate {
            display_text: entry.display_text,
            abspath: entry.abspath,
            is_dir: entry.is_dir,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScanKey {
    dir: PathBuf,
    only_dirs: bool,
}

struct ActiveScan {
    key: ScanKey,
    cancel: Arc<AtomicBool>,
    done: Arc<AtomicBool>,
}

impl Drop for ActiveScan {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

pub struct NucleoEngine {
    nucleo: Nucleo<Candidate>,
    // Re-scores matched items; the snapshot only exposes them in rank order.
    matcher: Matcher,
    waker: Waker,
    max_depth: usize,
    exclude: Arc<[Regex]>,
    scan: Option<ActiveScan>,
    pattern: String,
    cached: Option<Arc<[Match]>>,
}

impl NucleoEngine {
    pub fn new(max_depth: usize, exclude: Vec<Regex>, waker: Waker) -> Self {
        let nucleo = Nucleo::new(Config::DEFAULT.match_paths(), waker.clone(), None, 1);
        NucleoEngine {
            nucleo,
            matcher: Matcher::new(Config::DEFAULT.match_paths()),
            waker,
            max_depth,
            exclude: exclude.into(),
            scan: None,
            pattern: String::new(),
            cached: None,
        }
    }

    fn start_scan(&mut self, key: ScanKey) {
        // Dropping the previous scan cancels its thread.
        self.scan = None;
        self.nucleo.restart(true);
        self.cached = None;

        let cancel = Arc::new(AtomicBool::new(false));
        let done = Arc::new(AtomicBool::new(false));
        let options = ScanOptions {
            max_depth: self.max_depth,
            only_dirs: key.only_dirs,
            exclude: Arc::clone(&self.exclude),
        };
        let injector = self.nucleo.injector();
        let waker = Arc::clone(&self.waker);
        let root = key.dir.clone();
        let thread_cancel = Arc::clone(&cancel);
        let thread_done = Arc::clone(&done);

        log::debug!("scanning {} (only dirs: {})", root.display(), key.only_dirs);
        let spawned = thread::Builder::new()
            .name("choose-files-scan".to_string())
            .spawn(move || {
                let mut pending = 0;
                let count = file_scanner::scan_dir(&root, &options, &thread_cancel, |entry| {
                    injector.push(Candidate::from(entry), |c, cols| {
                        cols[0] = c.display_text.as_str().into();
                    });
                    pending += 1;
                    if pending == WAKE_EVERY_ENTRIES {
                        pending = 0;
                        waker();
                    }
                });
                log::debug!("scan of {} finished with {count} entries", root.display());
                thread_done.store(true, Ordering::Release);
                waker();
            });
        if let Err(e) = spawned {
            log::error!("failed to start directory scan: {e}");
            done.store(true, Ordering::Release);
        }

        self.scan = Some(ActiveScan { key, cancel, done });
    }

    fn scanning(&self) -> bool {
        self.scan
            .as_ref()
            .is_some_and(|scan| !scan.done.load(Ordering::Acquire))
    }

    fn collect_matches(&mut self, score_rules: &ScoreRules) -> Arc<[Match]> {
        let snapshot = self.nucleo.snapshot();
        let pattern = snapshot.pattern().column_pattern(0);
        let matcher = &mut self.matcher;
        let mut matches: Vec<Match> = snapshot
            .matched_items(..)
            .map(|item| {
                let candidate = item.data;
                let score = item
                    .matcher_columns
                    .first()
                    .and_then(|column| pattern.score(column.slice(..), matcher))
                    .unwrap_or(0);
                // An empty pattern scores everything 0; give the rules something to scale.
                let base = f64::from(score).max(1.0);
                Match {
                    display_text: candidate.display_text.clone(),
                    abspath: candidate.abspath.clone(),
                    is_dir: candidate.is_dir,
                    score: score_rules.apply(&candidate.display_text, base),
                }
            })
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.into()
    }
}

impl MatchEngine for NucleoEngine {
    fn results(&mut self, query: &MatchQuery<'_>) -> MatchResults {
        let key = ScanKey {
            dir: query.current_dir.to_path_buf(),
            only_dirs: query.only_dirs,
        };
        if self.scan.as_ref().map(|scan| &scan.key) != Some(&key) {
            self.start_scan(key);
        }

        if query.search_text != self.pattern {
            let append = query.search_text.starts_with(self.pattern.as_str());
            self.nucleo.pattern.reparse(
                0,
                query.search_text,
                CaseMatching::Smart,
                Normalization::Smart,
                append,
            );
            self.pattern = query.search_text.to_string();
            self.cached = None;
        }

        let status = self.nucleo.tick(TICK_TIMEOUT_MS);
        let matches = match self.cached.clone() {
            Some(matches) if !status.changed => matches,
            _ => {
                let matches = self.collect_matches(query.score_rules);
                self.cached = Some(Arc::clone(&matches));
                matches
            }
        };

        MatchResults {
            matches,
            in_progress: status.running || self.scanning(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tempfile::TempDir;

    fn settle(engine: &mut NucleoEngine, query: &MatchQuery<'_>) -> MatchResults {
        for _ in 0..500 {
            let results = engine.results(query);
            if !results.in_progress {
                return results;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("match engine never settled");
    }

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/notes.md"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join(".notes.bak"), "").unwrap();
        fs::write(dir.path().join("main.rs"), "").unwrap();
        dir
    }

    #[test]
    fn finds_and_ranks_matches() {
        let dir = tree();
        let wakeups = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakeups);
        let mut engine = NucleoEngine::new(
            4,
            Vec::new(),
            Arc::new(move || {
                counter.fetch_add(1, Ordering::Relaxed);
            }),
        );
        let rules = ScoreRules::compile(&[r"(^|/)\.[^/]+(/|$) *= 0.01"]).unwrap();
        let query = MatchQuery {
            search_text: "",
            current_dir: dir.path(),
            only_dirs: false,
            score_rules: &rules,
        };
        let all = settle(&mut engine, &query);
        assert_eq!(all.matches.len(), 5);
        assert_eq!(
            all.matches.last().map(|m| m.display_text.as_str()),
            Some(".notes.bak"),
            "hidden entries are demoted"
        );
        assert!(wakeups.load(Ordering::Relaxed) >= 1);

        let query = MatchQuery {
            search_text: "notes",
            ..query
        };
        let filtered = settle(&mut engine, &query);
        assert!(filtered.matches.iter().all(|m| m.display_text.contains("notes")));
        assert!(!filtered.matches.iter().any(|m| m.display_text == "main.rs"));
        assert!(
            filtered
                .matches
                .windows(2)
                .all(|w| w[0].score >= w[1].score)
        );
    }

    #[test]
    fn rules_reorder_fuzzy_matches() {
        let dir = tree();
        let mut engine = NucleoEngine::new(4, Vec::new(), Arc::new(|| {}));
        let rules = ScoreRules::default();
        let query = MatchQuery {
            search_text: "notes",
            current_dir: dir.path(),
            only_dirs: false,
            score_rules: &rules,
        };
        let plain = settle(&mut engine, &query);
        assert_eq!(plain.matches.len(), 3);
        assert!(
            plain.matches.iter().all(|m| m.score > 1.0),
            "a non-empty query carries nucleo's score"
        );

        let boosted = ScoreRules::compile(&[r"\.md$ += 1000"]).unwrap();
        let query = MatchQuery {
            score_rules: &boosted,
            ..query
        };
        let mut engine = NucleoEngine::new(4, Vec::new(), Arc::new(|| {}));
        let ranked = settle(&mut engine, &query);
        assert_eq!(ranked.matches[0].display_text, "docs/notes.md");
        assert!(ranked.matches[0].score > 1000.0);
        let others = &ranked.matches[1..];
        assert!(others.iter().all(|m| m.score < 1000.0));
    }

    #[test]
    fn directory_change_rescans() {
        let dir = tree();
        let mut engine = NucleoEngine::new(4, Vec::new(), Arc::new(|| {}));
        let rules = ScoreRules::default();
        let query = MatchQuery {
            search_text: "",
            current_dir: dir.path(),
            only_dirs: false,
            score_rules: &rules,
        };
        settle(&mut engine, &query);

        let docs = dir.path().join("docs");
        let query = MatchQuery {
            current_dir: &docs,
            ..query
        };
        let results = settle(&mut engine, &query);
        assert_eq!(results.matches.len(), 1);
        assert_eq!(results.matches[0].abspath, docs.join("notes.md"));
    }

    #[test]
    fn dirs_only_query() {
        let dir = tree();
        let mut engine = NucleoEngine::new(4, Vec::new(), Arc::new(|| {}));
        let rules = ScoreRules::default();
        let query = MatchQuery {
            search_text: "",
            current_dir: dir.path(),
            only_dirs: true,
            score_rules: &rules,
        };
        let results = settle(&mut engine, &query);
        assert_eq!(results.matches.len(), 1);
        assert!(results.matches[0].is_dir);
    }
}
