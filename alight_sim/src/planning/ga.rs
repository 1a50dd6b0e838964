// alight_sim/src/planning/ga.rs

//! Genetic-algorithm trajectory pre-planner.
//!
//! Searches for a planar (x, z) trajectory between two points. Each
//! individual carries, for every time step, the state `x, vx, z, vz` and the
//! inputs `az` (thrust) and `theta` (pitch). Scores are negative costs, so
//! higher is better.

use crate::planning::trajectory::TrajectoryRecord;
use anyhow::{ensure, Result};
use nalgebra::DMatrix;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::{debug, info};

/// Genes per time step: x, vx, z, vz, az, theta.
pub const GENES_PER_STEP: usize = 6;

const GRAVITY: f64 = 9.81;

/// Sampling range of each gene when drawn at random.
static GENE_RANGES: [Range<f64>; GENES_PER_STEP] = [
    -2.0..5.0,                                                 // x
    -5.0..5.0,                                                 // vx
    0.0..10.0,                                                 // z
    -5.0..5.0,                                                 // vz
    -10.0..10.0,                                               // az
    -std::f64::consts::FRAC_PI_2..std::f64::consts::FRAC_PI_2, // theta
];

// =========================================================================
// == Problem ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ProblemData {
    pub nb_steps: usize,
    /// Initial (x, z) position.
    pub pos_init: [f64; 2],
    pub pos_final: [f64; 2],
    /// Initial (vx, vz) velocity.
    pub vel_init: [f64; 2],
    pub vel_final: [f64; 2],
    pub thrust_init: f64,
    pub thrust_final: f64,
    pub theta_init: f64,
    pub theta_final: f64,
    /// Weights of the x error, z error, thrust and pitch costs.
    pub cost_weights: [f64; 4],
}

impl Default for ProblemData {
    fn default() -> Self {
        Self {
            nb_steps: 20,
            pos_init: [0.0, 0.0],
            pos_final: [3.0, 5.0],
            vel_init: [0.0, 0.0],
            vel_final: [0.0, 0.0],
            thrust_init: GRAVITY,
            thrust_final: GRAVITY,
            theta_init: 0.0,
            theta_final: 0.0,
            cost_weights: [1.0, 1.0, 0.1, 0.1],
        }
    }
}

impl ProblemData {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.nb_steps >= 2, "problem.nb_steps must be at least 2");
        ensure!(
            self.cost_weights.iter().all(|w| w.is_finite() && *w >= 0.0),
            "problem.cost_weights must be finite and non-negative"
        );
        Ok(())
    }
}

/// The reference trajectory: a straight line from the initial to the final
/// position, with the initial velocity and inputs held until the last step.
///
/// Returns a `6 x nb_steps` matrix, one column per time step.
pub fn calculate_desired(p: &ProblemData) -> Result<DMatrix<f64>> {
    p.validate()?;
    let n = p.nb_steps;
    let mut desired = DMatrix::zeros(GENES_PER_STEP, n);

    for i in 0..n {
        let s = i as f64 / (n - 1) as f64;
        let column = if i == n - 1 {
            [
                p.pos_final[0],
                p.vel_final[0],
                p.pos_final[1],
                p.vel_final[1],
                p.thrust_final,
                p.theta_final,
            ]
        } else {
            [
                p.pos_init[0] + s * (p.pos_final[0] - p.pos_init[0]),
                p.vel_init[0],
                p.pos_init[1] + s * (p.pos_final[1] - p.pos_init[1]),
                p.vel_init[1],
                p.thrust_init,
                p.theta_init,
            ]
        };
        for (row, value) in column.into_iter().enumerate() {
            desired[(row, i)] = value;
        }
    }
    Ok(desired)
}

// =========================================================================
// == Individuals ==
// =========================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    /// `nb_steps * 6` genes, grouped by time step.
    pub chromosome: Vec<f64>,
    pub nb_steps: usize,
    pub score: f64,
}

impl Individual {
    pub fn random<R: Rng>(nb_steps: usize, rng: &mut R) -> Self {
        let chromosome = (0..nb_steps)
            .flat_map(|_| GENE_RANGES.iter().cloned())
            .map(|range| rng.gen_range(range))
            .collect();
        Self {
            chromosome,
            nb_steps,
            score: f64::NEG_INFINITY,
        }
    }

    /// An individual sitting exactly on a `6 x nb_steps` reference.
    pub fn from_desired(desired: &DMatrix<f64>) -> Self {
        // Column-major storage keeps the genes of one time step together.
        Self {
            chromosome: desired.as_slice().to_vec(),
            nb_steps: desired.ncols(),
            score: f64::NEG_INFINITY,
        }
    }

    pub fn as_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_column_slice(GENES_PER_STEP, self.nb_steps, &self.chromosome)
    }

    pub fn to_records(&self) -> Vec<TrajectoryRecord> {
        self.chromosome
            .chunks_exact(GENES_PER_STEP)
            .enumerate()
            .map(|(time_step, g)| TrajectoryRecord {
                time_step,
                x: g[0],
                vx: g[1],
                z: g[2],
                vz: g[3],
                az: g[4],
                theta: g[5],
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Population {
    pub individuals: Vec<Individual>,
}

impl Population {
    /// `size` copies of the reference trajectory.
    pub fn seeded(desired: &DMatrix<f64>, size: usize) -> Self {
        Self {
            individuals: vec![Individual::from_desired(desired); size],
        }
    }

    pub fn random<R: Rng>(nb_steps: usize, size: usize, rng: &mut R) -> Self {
        Self {
            individuals: (0..size).map(|_| Individual::random(nb_steps, rng)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }
}

// =========================================================================
// == Planner ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GaConfig {
    pub max_generations: usize,
    pub population_size: usize,
    pub tournament_size: usize,
    pub crossover_probability: f64,
    pub mutation_probability: f64,
    /// Optional seed for a reproducible search.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            max_generations: 100,
            population_size: 50,
            tournament_size: 3,
            crossover_probability: 0.8,
            mutation_probability: 0.01,
            seed: None,
        }
    }
}

impl GaConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.population_size >= 2, "planner.population_size must be at least 2");
        ensure!(self.tournament_size >= 1, "planner.tournament_size must be at least 1");
        ensure!(
            (0.0..=1.0).contains(&self.crossover_probability),
            "planner.crossover_probability must be in [0, 1]"
        );
        ensure!(
            (0.0..=1.0).contains(&self.mutation_probability),
            "planner.mutation_probability must be in [0, 1]"
        );
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GaPlanner {
    config: GaConfig,
    rng: ChaCha8Rng,
}

impl GaPlanner {
    pub fn new(config: GaConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self { config, rng })
    }

    /// Scores one individual against the reference. Penalizes deviation from
    /// the line, jumps between consecutive positions, thrust away from
    /// hover and pitch.
    pub fn evaluate(&self, individual: &mut Individual, data: &ProblemData, desired: &DMatrix<f64>) {
        let genes = individual.as_matrix();
        let [w_x, w_z, w_thrust, w_theta] = data.cost_weights;

        let x = genes.row(0);
        let z = genes.row(2);
        let mut cost = w_x * (&x - &desired.row(0)).norm_squared();
        cost += w_z * (&z - &desired.row(2)).norm_squared();

        for i in 1..individual.nb_steps {
            cost += (x[i] - x[i - 1]).abs().powi(4);
            cost += (z[i] - z[i - 1]).abs().powi(4);
        }

        cost += w_thrust * genes.row(4).map(|az| az - GRAVITY).norm_squared();
        cost += w_theta * genes.row(5).norm_squared();

        individual.score = -cost;
    }

    pub fn evaluate_population(&self, population: &mut Population, data: &ProblemData, desired: &DMatrix<f64>) {
        for individual in &mut population.individuals {
            self.evaluate(individual, data, desired);
        }
    }

    /// Replaces the population with the winners of `population.len()`
    /// tournaments, each between `tournament_size` random entrants.
    pub fn tournament_selection(&mut self, population: &mut Population) {
        if population.is_empty() {
            return;
        }

        let n = population.len();
        let mut selection = Vec::with_capacity(n);
        for _ in 0..n {
            let mut best = self.rng.gen_range(0..n);
            for _ in 1..self.config.tournament_size {
                let entrant = self.rng.gen_range(0..n);
                if population.individuals[entrant].score > population.individuals[best].score {
                    best = entrant;
                }
            }
            selection.push(population.individuals[best].clone());
        }
        population.individuals = selection;
    }

    /// With `crossover_probability`, swaps the first half of the two
    /// chromosomes.
    pub fn point_crossover(&mut self, a: &mut Individual, b: &mut Individual) {
        if !self.rng.gen_bool(self.config.crossover_probability) {
            return;
        }
        let xpoint = a.chromosome.len().min(b.chromosome.len()) / 2;
        a.chromosome[..xpoint].swap_with_slice(&mut b.chromosome[..xpoint]);
    }

    /// Redraws each gene with `mutation_probability`.
    pub fn point_mutation(&mut self, individual: &mut Individual) {
        for (i, gene) in individual.chromosome.iter_mut().enumerate() {
            if self.rng.gen_bool(self.config.mutation_probability) {
                *gene = self.rng.gen_range(GENE_RANGES[i % GENES_PER_STEP].clone());
            }
        }
    }

    pub fn find_best(population: &Population) -> Option<&Individual> {
        population
            .individuals
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }

    /// Evolves a population seeded on the reference trajectory and returns
    /// the best individual seen in any generation.
    pub fn optimize(&mut self, data: &ProblemData) -> Result<Individual> {
        let desired = calculate_desired(data)?;
        let mut population = Population::seeded(&desired, self.config.population_size);

        self.evaluate_population(&mut population, data, &desired);
        let mut best = Self::find_best(&population)
            .cloned()
            .unwrap_or_else(|| Individual::from_desired(&desired));

        for generation in 0..self.config.max_generations {
            self.tournament_selection(&mut population);

            for pair in population.individuals.chunks_exact_mut(2) {
                let (left, right) = pair.split_at_mut(1);
                self.point_crossover(&mut left[0], &mut right[0]);
                self.point_mutation(&mut left[0]);
                self.point_mutation(&mut right[0]);
            }

            self.evaluate_population(&mut population, data, &desired);
            if let Some(candidate) = Self::find_best(&population) {
                if candidate.score > best.score {
                    best = candidate.clone();
                }
            }
            debug!(generation, score = best.score, "GA generation");
        }

        info!(
            generations = self.config.max_generations,
            score = best.score,
            "GA optimization finished"
        );
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn planner(seed: u64) -> GaPlanner {
        GaPlanner::new(GaConfig {
            max_generations: 30,
            population_size: 20,
            seed: Some(seed),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_desired_is_a_straight_line() {
        let data = ProblemData {
            nb_steps: 5,
            pos_init: [0.0, 0.0],
            pos_final: [4.0, 8.0],
            ..Default::default()
        };
        let desired = calculate_desired(&data).unwrap();
        assert_eq!(desired.shape(), (6, 5));
        for i in 0..5 {
            assert_abs_diff_eq!(desired[(0, i)], i as f64, epsilon = 1e-12);
            assert_abs_diff_eq!(desired[(2, i)], 2.0 * i as f64, epsilon = 1e-12);
            assert_abs_diff_eq!(desired[(4, i)], GRAVITY, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_vertical_line_is_allowed() {
        let data = ProblemData {
            nb_steps: 3,
            pos_init: [1.0, 0.0],
            pos_final: [1.0, 6.0],
            ..Default::default()
        };
        let desired = calculate_desired(&data).unwrap();
        assert_abs_diff_eq!(desired[(0, 1)], 1.0);
        assert_abs_diff_eq!(desired[(2, 1)], 3.0);
    }

    #[test]
    fn test_too_few_steps_rejected() {
        let data = ProblemData {
            nb_steps: 1,
            ..Default::default()
        };
        assert!(calculate_desired(&data).is_err());
    }

    #[test]
    fn test_reference_scores_better_than_random() {
        let data = ProblemData::default();
        let desired = calculate_desired(&data).unwrap();
        let ga = planner(1);

        let mut reference = Individual::from_desired(&desired);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut random = Individual::random(data.nb_steps, &mut rng);
        ga.evaluate(&mut reference, &data, &desired);
        ga.evaluate(&mut random, &data, &desired);

        assert!(reference.score > random.score);
        assert!(reference.score <= 0.0);
    }

    #[test]
    fn test_crossover_swaps_first_half() {
        let mut ga = GaPlanner::new(GaConfig {
            crossover_probability: 1.0,
            seed: Some(0),
            ..Default::default()
        })
        .unwrap();
        let mut a = Individual {
            chromosome: vec![1.0; 12],
            nb_steps: 2,
            score: 0.0,
        };
        let mut b = Individual {
            chromosome: vec![2.0; 12],
            nb_steps: 2,
            score: 0.0,
        };
        ga.point_crossover(&mut a, &mut b);
        assert_eq!(&a.chromosome[..6], &[2.0; 6]);
        assert_eq!(&a.chromosome[6..], &[1.0; 6]);
        assert_eq!(&b.chromosome[..6], &[1.0; 6]);
    }

    #[test]
    fn test_mutation_stays_in_gene_ranges() {
        let mut ga = GaPlanner::new(GaConfig {
            mutation_probability: 1.0,
            seed: Some(9),
            ..Default::default()
        })
        .unwrap();
        let mut ind = Individual {
            chromosome: vec![100.0; 30],
            nb_steps: 5,
            score: 0.0,
        };
        ga.point_mutation(&mut ind);
        for (i, gene) in ind.chromosome.iter().enumerate() {
            assert!(GENE_RANGES[i % GENES_PER_STEP].contains(gene));
        }
    }

    #[test]
    fn test_tournament_of_one_keeps_size() {
        let mut ga = GaPlanner::new(GaConfig {
            tournament_size: 1,
            seed: Some(2),
            ..Default::default()
        })
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut population = Population::random(4, 7, &mut rng);
        ga.tournament_selection(&mut population);
        assert_eq!(population.len(), 7);
    }

    #[test]
    fn test_optimize_never_gets_worse_than_reference() {
        let data = ProblemData::default();
        let desired = calculate_desired(&data).unwrap();
        let mut ga = planner(11);

        let mut reference = Individual::from_desired(&desired);
        ga.evaluate(&mut reference, &data, &desired);

        let best = ga.optimize(&data).unwrap();
        assert!(best.score >= reference.score);
        assert_eq!(best.chromosome.len(), data.nb_steps * GENES_PER_STEP);
        assert_eq!(best.to_records().len(), data.nb_steps);
    }

    #[test]
    fn test_same_seed_same_result() {
        let data = ProblemData::default();
        let a = planner(4).optimize(&data).unwrap();
        let b = planner(4).optimize(&data).unwrap();
        assert_eq!(a, b);
    }
}
