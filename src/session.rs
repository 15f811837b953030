use crate::clustering::{ClusterOptions, ClusterResult, Clusterer, SpeciesTree, WeightKey, Weights};
use crate::embedding::Embedding;
use crate::error::{MiphyError, Result};
use crate::info::{normalize_quoted_names, InfoFile};
use crate::phylo::{ParsedTree, TreeFormat};
use crate::verbose;
use crossbeam_channel::{bounded, unbounded};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Instant;

type Slot = Arc<Mutex<Option<Arc<ClusterResult>>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Fresh,
    Processed,
    Consumed,
}

/// One gene tree with its species information, optional embedding and the
/// clustering results computed so far, one per weight tuple.
pub struct Session {
    clusterer: Clusterer,
    embedding: Option<Embedding>,
    species: Vec<String>,
    colours: BTreeMap<String, String>,
    renamed: Vec<(String, String)>,
    cache: Mutex<HashMap<WeightKey, Slot>>,
    state: Mutex<SessionState>,
    verbose: bool,
}

impl Session {
    /// Validates the tree against the information file. Quoted leaf names
    /// whose unquoted form is assigned a species are renamed first; see
    /// [`Session::renamed_leaves`].
    pub fn new(gene_tree: ParsedTree, info: &InfoFile) -> Result<Self> {
        let renamed = normalize_quoted_names(&info.mapping, gene_tree.leaf_names());
        let gene_tree = if renamed.is_empty() {
            gene_tree
        } else {
            let table: HashMap<String, String> = renamed.iter().cloned().collect();
            gene_tree.rename_leaves(&table)?
        };

        let species_tree = SpeciesTree::parse(&info.species_tree)?;
        let clusterer = Clusterer::new(gene_tree, species_tree, &info.mapping)?;

        Ok(Self {
            clusterer,
            embedding: None,
            species: info.species.clone(),
            colours: info.colours.clone(),
            renamed,
            cache: Mutex::new(HashMap::new()),
            state: Mutex::new(SessionState::Fresh),
            verbose: false,
        })
    }

    pub fn from_texts(tree_text: &str, format: TreeFormat, info_text: &str) -> Result<Self> {
        let info = InfoFile::parse(info_text)?;
        Self::new(format.parse(tree_text)?, &info)
    }

    pub fn with_embedding(mut self, embedding: Embedding) -> Result<Self> {
        let leaf_count = self.clusterer.gene_tree().leaf_count();
        if embedding.rows() != leaf_count {
            return Err(MiphyError::validation(format!(
                "the coordinates hold {} rows but the gene tree has {} sequences",
                embedding.rows(),
                leaf_count
            )));
        }
        self.embedding = Some(embedding);
        Ok(self)
    }

    pub fn with_options(mut self, options: ClusterOptions) -> Self {
        self.clusterer = self.clusterer.with_options(options);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn gene_tree(&self) -> &ParsedTree {
        self.clusterer.gene_tree()
    }

    pub fn clusterer(&self) -> &Clusterer {
        &self.clusterer
    }

    pub fn embedding(&self) -> Option<&Embedding> {
        self.embedding.as_ref()
    }

    pub fn sequence_names(&self) -> Vec<&str> {
        self.gene_tree().leaf_names()
    }

    pub fn species(&self) -> &[String] {
        &self.species
    }

    pub fn species_of(&self, sequence: &str) -> Option<&str> {
        self.clusterer.species_of(sequence)
    }

    pub fn colours(&self) -> &BTreeMap<String, String> {
        &self.colours
    }

    /// `(quoted, unquoted)` leaf renames applied while building the session.
    pub fn renamed_leaves(&self) -> &[(String, String)] {
        &self.renamed
    }

    pub fn state(&self) -> SessionState {
        *lock(&self.state)
    }

    /// First clustering of the session. May only be called once.
    pub fn process(&self, weights: &Weights) -> Result<Arc<ClusterResult>> {
        {
            let mut state = lock(&self.state);
            if *state != SessionState::Fresh {
                return Err(MiphyError::runtime(
                    "a session cannot be processed twice, and must be processed before its results are consumed",
                ));
            }
            *state = SessionState::Processed;
        }
        let result = self.results(weights);
        if result.is_err() {
            *lock(&self.state) = SessionState::Fresh;
        }
        result
    }

    /// Marks the processed results as delivered.
    pub fn consume(&self) -> Result<()> {
        let mut state = lock(&self.state);
        match *state {
            SessionState::Processed => {
                *state = SessionState::Consumed;
                Ok(())
            }
            SessionState::Fresh => Err(MiphyError::runtime(
                "a session cannot have its results consumed before being processed",
            )),
            SessionState::Consumed => Err(MiphyError::runtime("the session results were already consumed")),
        }
    }

    pub fn is_cached(&self, weights: &Weights) -> bool {
        let Some(slot) = lock(&self.cache).get(&weights.key()).cloned() else {
            return false;
        };
        let cached = lock(&slot).is_some();
        cached
    }

    /// Clustering for `weights`, computed on first request and cached.
    pub fn results(&self, weights: &Weights) -> Result<Arc<ClusterResult>> {
        weights.validate()?;
        let slot = lock(&self.cache).entry(weights.key()).or_default().clone();

        let mut entry = lock(&slot);
        if let Some(result) = entry.as_ref() {
            verbose!(self.verbose, "clustering pattern for {} retrieved from cache", weights);
            return Ok(Arc::clone(result));
        }

        let started = Instant::now();
        let result = Arc::new(self.clusterer.cluster(weights, self.embedding.as_ref())?);
        verbose!(
            self.verbose,
            "clustering with weights {} took {:.2} seconds ({} groups)",
            weights,
            started.elapsed().as_secs_f64(),
            result.clusters.len()
        );
        *entry = Some(Arc::clone(&result));
        Ok(result)
    }

    /// Computes several weight tuples on `threads` workers. Results are
    /// returned in the order of `weights`.
    pub fn sweep(&self, weights: &[Weights], threads: usize) -> Result<Vec<Arc<ClusterResult>>> {
        for w in weights {
            w.validate()?;
        }
        let threads = threads.clamp(1, weights.len().max(1));
        let (job_tx, job_rx) = bounded::<(usize, Weights)>(threads * 2);
        let (done_tx, done_rx) = unbounded();

        thread::scope(|scope| {
            for _ in 0..threads {
                let job_rx = job_rx.clone();
                let done_tx = done_tx.clone();
                scope.spawn(move || {
                    while let Ok((idx, w)) = job_rx.recv() {
                        if done_tx.send((idx, self.results(&w))).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(done_tx);
            for job in weights.iter().copied().enumerate() {
                if job_tx.send(job).is_err() {
                    break;
                }
            }
            drop(job_tx);
        });

        let mut results = vec![None; weights.len()];
        for (idx, result) in done_rx.iter() {
            results[idx] = Some(result?);
        }
        results
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| MiphyError::runtime("a sweep worker stopped before finishing its weights"))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
