//! Distributed Monte Carlo estimate of pi.
use crate::{reduce_sum, CommGroup, Config, Partition, PiEstimate, Result, Sampler};
use tracing::{debug, info, instrument, warn};

/// Run one estimation round on this rank.
///
/// Every rank samples its share of `config.iterations` with a generator
/// seeded from its rank, then the counts are summed onto `config.root`.
/// Returns the estimate on the root and `None` elsewhere. All ranks must
/// call this with the same configuration (see [`Config::synchronize`]).
#[instrument(skip_all, fields(rank = cg.rank(), size = cg.size()))]
pub async fn compute_pi<C: CommGroup>(cg: &C, config: &Config) -> Result<Option<PiEstimate>> {
    let rank = cg.rank();
    let size = cg.size();
    config.validate(size)?;

    let partition = Partition::new(config.iterations, size, config.partition)?;
    let iterations = partition.share(rank);
    debug!(iterations, policy = %partition.policy(), "sampling");

    let mut sampler = Sampler::for_rank(rank, config.seed);
    let inside = sampler.sample(iterations);
    debug!(inside, "local sampling done");

    let total = match reduce_sum(cg, inside, config.root).await? {
        Some(total) => total,
        None => return Ok(None),
    };

    let estimate = PiEstimate::new(total, partition.executed());
    if estimate.is_degenerate() {
        warn!(
            iterations = config.iterations,
            size, "no samples were drawn, the estimate is undefined"
        );
    } else {
        info!(
            pi = estimate.value,
            error = estimate.abs_error(),
            samples = estimate.samples,
            "estimate ready"
        );
    }
    Ok(Some(estimate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{local, PartitionPolicy};
    use futures::executor;

    fn run(size: u32, config: Config) -> Vec<Option<PiEstimate>> {
        local::run(size, |cg| executor::block_on(compute_pi(&cg, &config)).unwrap()).unwrap()
    }

    #[test]
    fn only_root_gets_an_estimate() {
        let config = Config {
            iterations: 40_000,
            root: 2,
            ..Config::default()
        };
        let results = run(3, config);
        assert!(results[0].is_none());
        assert!(results[1].is_none());
        assert!(results[2].is_some());
    }

    #[test]
    fn sum_matches_independent_samplers() {
        let config = Config {
            iterations: 10_000,
            seed: 7,
            ..Config::default()
        };
        let results = run(4, config);
        let expected: u64 = (0..4)
            .map(|rank| Sampler::for_rank(rank, 7).sample(2_500))
            .sum();
        let estimate = results[0].unwrap();
        assert_eq!(estimate.inside, expected);
        assert_eq!(estimate.samples, 10_000);
    }

    #[test]
    fn truncation_drops_samples() {
        let config = Config {
            iterations: 1_003,
            ..Config::default()
        };
        let estimate = run(4, config)[0].unwrap();
        assert_eq!(estimate.samples, 1_000);
    }

    #[test]
    fn spread_uses_whole_budget() {
        let config = Config {
            iterations: 1_003,
            partition: PartitionPolicy::Spread,
            ..Config::default()
        };
        let estimate = run(4, config)[0].unwrap();
        assert_eq!(estimate.samples, 1_003);
        let expected: u64 = [251, 251, 251, 250]
            .iter()
            .zip(0..)
            .map(|(&n, rank)| Sampler::for_rank(rank, 0).sample(n))
            .sum();
        assert_eq!(estimate.inside, expected);
    }

    #[test]
    fn zero_budget_reports_nan() {
        let config = Config {
            iterations: 0,
            ..Config::default()
        };
        let estimate = run(2, config)[0].unwrap();
        assert!(estimate.is_degenerate());
        assert_eq!(estimate.inside, 0);
        assert!(estimate.value.is_nan());
    }

    #[test]
    fn budget_smaller_than_group_does_not_crash() {
        let config = Config {
            iterations: 3,
            ..Config::default()
        };
        let estimate = run(4, config)[0].unwrap();
        assert!(estimate.is_degenerate());
    }

    #[test]
    fn invalid_root_fails_on_every_rank() {
        let config = Config {
            iterations: 100,
            root: 9,
            ..Config::default()
        };
        let errors = local::run(2, |cg| executor::block_on(compute_pi(&cg, &config)).is_err())
            .unwrap();
        assert_eq!(errors, vec![true, true]);
    }
}
