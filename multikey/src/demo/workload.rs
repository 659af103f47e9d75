use multikey::{CompositeKey, IndexedCollection};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;
use threadpool::ThreadPool;

type Collection = IndexedCollection<u32, String, u64>;

#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    pub threads: usize,
    pub writers: usize,
    pub readers: usize,
    pub ops_per_thread: usize,
    /// Ids and names are drawn from `0..key_space`
    pub key_space: u32,
    pub seed: u64,
}

/// What the jobs of one kind did, summed once they are all done.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub adds: u64,
    pub rejected_adds: u64,
    pub sets: u64,
    pub missed_sets: u64,
    pub removes: u64,
    pub missed_removes: u64,
    pub hits: u64,
    pub misses: u64,
    /// consistency checks run by readers while writers were busy
    pub checks: u64,
    /// checks that found the indexes disagreeing
    pub inconsistent_views: u64,
}

impl Tally {
    fn merge(&mut self, other: &Tally) {
        self.adds += other.adds;
        self.rejected_adds += other.rejected_adds;
        self.sets += other.sets;
        self.missed_sets += other.missed_sets;
        self.removes += other.removes;
        self.missed_removes += other.missed_removes;
        self.hits += other.hits;
        self.misses += other.misses;
        self.checks += other.checks;
        self.inconsistent_views += other.inconsistent_views;
    }
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub seed: u64,
    pub threads: usize,
    pub writers: usize,
    pub readers: usize,
    pub ops_per_thread: usize,
    pub tally: Tally,
    pub count: usize,
    pub distinct_ids: usize,
    pub distinct_names: usize,
    pub consistent: bool,
    pub elapsed_ms: u128,
}

impl Report {
    /// Entries left must match what the writers managed to add and remove.
    pub fn count_matches(&self) -> bool {
        self.tally.adds.checked_sub(self.tally.removes) == Some(self.count as u64)
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let tally = &self.tally;
        writeln!(
            f,
            "seed {} | {} writers, {} readers on {} threads, {} ops each",
            self.seed, self.writers, self.readers, self.threads, self.ops_per_thread
        )?;
        writeln!(
            f,
            "adds {} (rejected {}), sets {} (missed {}), removes {} (missed {})",
            tally.adds,
            tally.rejected_adds,
            tally.sets,
            tally.missed_sets,
            tally.removes,
            tally.missed_removes
        )?;
        writeln!(
            f,
            "reads {} hits, {} misses, {} of {} checks inconsistent",
            tally.hits, tally.misses, tally.inconsistent_views, tally.checks
        )?;
        write!(
            f,
            "{} entries over {} ids and {} names, consistent: {}, took {}ms",
            self.count, self.distinct_ids, self.distinct_names, self.consistent, self.elapsed_ms
        )
    }
}

fn draw_key(rng: &mut StdRng, key_space: u32) -> (u32, String) {
    let id = rng.random_range(0..key_space);
    let name = format!("name-{}", rng.random_range(0..key_space));
    (id, name)
}

fn write_loop(collection: &Collection, config: &WorkloadConfig, worker: usize) -> Tally {
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(worker as u64));
    let mut tally = Tally::default();

    for op in 0..config.ops_per_thread {
        let (id, name) = draw_key(&mut rng, config.key_space);
        let value = ((worker as u64) << 32) | op as u64;

        match rng.random_range(0..3) {
            0 => match collection.add(id, name, value) {
                Ok(()) => tally.adds += 1,
                Err(_) => tally.rejected_adds += 1,
            },
            1 => match collection.set(&id, &name, value) {
                Ok(()) => tally.sets += 1,
                Err(_) => tally.missed_sets += 1,
            },
            _ => {
                // another writer may replace or remove the value in between
                let removed = collection
                    .get(&id, &name)
                    .is_ok_and(|current| collection.remove(&CompositeKey::new(id, name), &current));
                if removed {
                    tally.removes += 1;
                } else {
                    tally.missed_removes += 1;
                }
            }
        }
    }

    tally
}

fn read_loop(collection: &Collection, config: &WorkloadConfig, worker: usize) -> Tally {
    const CHECK_EVERY: usize = 64;

    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(worker as u64));
    let mut tally = Tally::default();

    for op in 0..config.ops_per_thread {
        if op % CHECK_EVERY == 0 {
            tally.checks += 1;
            if !collection.is_consistent() {
                log::warn!("reader {worker} saw the indexes disagree");
                tally.inconsistent_views += 1;
            }
        }

        let (id, name) = draw_key(&mut rng, config.key_space);

        let found = match rng.random_range(0..4) {
            0 => collection.get(&id, &name).is_ok(),
            1 => collection.contains_key(&id, &name),
            2 => collection.get_by_id(&id).is_ok(),
            _ => collection.get_by_name(&name).is_ok(),
        };

        if found {
            tally.hits += 1;
        } else {
            tally.misses += 1;
        }
    }

    tally
}

/// Run writers and readers against one shared collection on a thread pool,
/// then check that the indexes agree with each other.
pub fn run(config: &WorkloadConfig) -> Report {
    let start = Instant::now();
    let collection = Arc::new(Collection::with_capacity(config.key_space as usize));
    let pool = ThreadPool::new(config.threads);
    let (tx, rx) = flume::unbounded();

    let jobs = config.writers + config.readers;
    for worker in 0..jobs {
        let collection = collection.clone();
        let config = config.clone();
        let tx = tx.clone();
        let is_writer = worker < config.writers;

        pool.execute(move || {
            let tally = if is_writer {
                write_loop(&collection, &config, worker)
            } else {
                read_loop(&collection, &config, worker)
            };
            log::debug!("job {worker} done: {tally:?}");
            if let Err(err) = tx.send(tally) {
                log::warn!("job {worker} could not report its tally: {err}");
            }
        });
    }
    drop(tx);
    pool.join();

    let mut tally = Tally::default();
    for job in rx.drain() {
        tally.merge(&job);
    }

    if pool.panic_count() > 0 {
        log::error!("{} jobs panicked", pool.panic_count());
    }

    let report = Report {
        seed: config.seed,
        threads: config.threads,
        writers: config.writers,
        readers: config.readers,
        ops_per_thread: config.ops_per_thread,
        tally,
        count: collection.count(),
        distinct_ids: collection.ids().len(),
        distinct_names: collection.names().len(),
        consistent: collection.is_consistent(),
        elapsed_ms: start.elapsed().as_millis(),
    };

    log::debug!("workload over: {report:?}");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(writers: usize, readers: usize) -> WorkloadConfig {
        WorkloadConfig {
            threads: 4,
            writers,
            readers,
            ops_per_thread: 2_000,
            key_space: 16,
            seed: 42,
        }
    }

    #[test]
    fn mixed_workload_stays_consistent() {
        let report = run(&config(3, 5));

        assert!(report.consistent);
        assert!(report.count_matches());
        assert_eq!(report.tally.inconsistent_views, 0);
        assert_eq!(report.tally.checks, 5 * 2_000_u64.div_ceil(64));
        assert_eq!(report.tally.hits + report.tally.misses, 5 * 2_000);
        assert!(report.count <= 16 * 16);
    }

    #[test]
    fn single_writer_is_deterministic() {
        let first = run(&config(1, 0));
        let second = run(&config(1, 0));

        assert_eq!(first.tally, second.tally);
        assert_eq!(first.count, second.count);
        assert!(first.count_matches());
    }

    #[test]
    fn json_report() {
        let report = run(&config(1, 1));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["seed"], 42);
        assert_eq!(json["consistent"], true);
        assert_eq!(json["count"], report.count);
    }
}
