//! k-means++ clustering of sampled pixels in CIE Lab
//!
//! # Algorithm
//! 1. Pick K from the sample count (more samples, more clusters, within 3..=10)
//! 2. Seed with k-means++ (each next seed drawn proportionally to D²)
//! 3. Lloyd iterations until assignments stop changing or the budget runs out
//! 4. Fold clusters below the minimum share into their nearest survivor
//! 5. Classify each survivor's most central pixel and vote, weighting by
//!    size and chroma so saturated clusters beat large dull ones

use rand::Rng;
use std::collections::HashMap;

use crate::color::{classify_lab, ColorCategory, Lab};
use crate::config::DetectionConfig;

const MIN_CLUSTERS: usize = 3;
const MAX_CLUSTERS: usize = 10;
/// One extra cluster per this many samples
const SAMPLES_PER_CLUSTER: usize = 350;

/// Number of clusters for `samples` pixels (never more than there are pixels)
pub fn cluster_count(samples: usize) -> usize {
    (samples / SAMPLES_PER_CLUSTER)
        .clamp(MIN_CLUSTERS, MAX_CLUSTERS)
        .min(samples)
}

#[derive(Debug, Clone)]
struct Cluster {
    centroid: Lab,
    members: Vec<usize>,
}

/// Rank the colour categories present in `samples`, most dominant first
pub fn dominant_categories<R: Rng + ?Sized>(
    samples: &[[u8; 3]],
    config: &DetectionConfig,
    rng: &mut R,
) -> Vec<ColorCategory> {
    if samples.is_empty() || config.top_categories == 0 {
        return Vec::new();
    }

    let points: Vec<Lab> = samples.iter().map(|rgb| Lab::from_rgb(*rgb)).collect();
    let k = cluster_count(points.len());

    let centroids = seed_centroids(&points, k, rng);
    let clusters = lloyd(&points, centroids, config.max_iterations);
    let clusters = merge_small_clusters(clusters, points.len(), config.min_cluster_share);

    let mut votes: HashMap<ColorCategory, f32> = HashMap::new();
    for cluster in &clusters {
        let Some(representative) = cluster
            .members
            .iter()
            .copied()
            .min_by(|a, b| {
                points[*a]
                    .distance_squared(&cluster.centroid)
                    .total_cmp(&points[*b].distance_squared(&cluster.centroid))
            })
        else {
            continue;
        };

        let category = classify_lab(samples[representative]);
        let weight = cluster.members.len() as f32 * (1.0 + cluster.centroid.chroma() / 100.0);
        *votes.entry(category).or_insert(0.0) += weight;
    }

    let mut ranked: Vec<(ColorCategory, f32)> = votes.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(config.top_categories)
        .map(|(category, _)| category)
        .collect()
}

/// k-means++ seeding
///
/// Stops early, with fewer than `k` seeds, once every point coincides with a
/// seed (nothing left to separate).
fn seed_centroids<R: Rng + ?Sized>(points: &[Lab], k: usize, rng: &mut R) -> Vec<Lab> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())]);

    let mut nearest: Vec<f32> = points
        .iter()
        .map(|p| p.distance_squared(&centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f32 = nearest.iter().sum();
        if total <= 0.0 {
            break;
        }

        let mut target = rng.gen_range(0.0..total);
        let mut chosen = points.len() - 1;
        for (i, d) in nearest.iter().enumerate() {
            if target < *d {
                chosen = i;
                break;
            }
            target -= d;
        }

        let seed = points[chosen];
        centroids.push(seed);
        for (d, p) in nearest.iter_mut().zip(points) {
            *d = d.min(p.distance_squared(&seed));
        }
    }

    centroids
}

fn nearest_centroid(point: &Lab, centroids: &[Lab]) -> usize {
    centroids
        .iter()
        .enumerate()
        .min_by(|a, b| point.distance_squared(a.1).total_cmp(&point.distance_squared(b.1)))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Lloyd iterations; an emptied cluster keeps its previous centroid
fn lloyd(points: &[Lab], mut centroids: Vec<Lab>, max_iterations: usize) -> Vec<Cluster> {
    let mut assignment: Vec<usize> = points
        .iter()
        .map(|p| nearest_centroid(p, &centroids))
        .collect();

    for _ in 0..max_iterations {
        let mut sums = vec![(0.0f32, 0.0f32, 0.0f32, 0usize); centroids.len()];
        for (point, cluster) in points.iter().zip(&assignment) {
            let sum = &mut sums[*cluster];
            sum.0 += point.l;
            sum.1 += point.a;
            sum.2 += point.b;
            sum.3 += 1;
        }
        for (centroid, (l, a, b, count)) in centroids.iter_mut().zip(sums) {
            if count > 0 {
                let n = count as f32;
                *centroid = Lab { l: l / n, a: a / n, b: b / n };
            }
        }

        let mut changed = false;
        for (point, cluster) in points.iter().zip(assignment.iter_mut()) {
            let next = nearest_centroid(point, &centroids);
            if next != *cluster {
                *cluster = next;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let mut clusters: Vec<Cluster> = centroids
        .into_iter()
        .map(|centroid| Cluster { centroid, members: Vec::new() })
        .collect();
    for (i, cluster) in assignment.into_iter().enumerate() {
        clusters[cluster].members.push(i);
    }
    clusters
}

/// Fold clusters under `min_share` of the samples into their nearest survivor
///
/// If no cluster reaches the share, the largest one survives alone.
fn merge_small_clusters(clusters: Vec<Cluster>, total: usize, min_share: f32) -> Vec<Cluster> {
    let min_size = (total as f32 * min_share).ceil() as usize;
    let (mut survivors, mut small): (Vec<Cluster>, Vec<Cluster>) = clusters
        .into_iter()
        .filter(|c| !c.members.is_empty())
        .partition(|c| c.members.len() >= min_size);

    if survivors.is_empty() {
        let Some(largest) = small
            .iter()
            .enumerate()
            .max_by_key(|(_, c)| c.members.len())
            .map(|(i, _)| i)
        else {
            return Vec::new();
        };
        survivors.push(small.swap_remove(largest));
    }

    for cluster in small {
        let centroids: Vec<Lab> = survivors.iter().map(|s| s.centroid).collect();
        let target = nearest_centroid(&cluster.centroid, &centroids);
        survivors[target].members.extend(cluster.members);
    }

    survivors
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const RED: [u8; 3] = [220, 38, 38];
    const BLUE: [u8; 3] = [37, 99, 235];
    const GREEN: [u8; 3] = [34, 160, 70];
    const YELLOW: [u8; 3] = [234, 209, 8];

    fn repeat(color: [u8; 3], n: usize) -> Vec<[u8; 3]> {
        vec![color; n]
    }

    fn detect(samples: &[[u8; 3]]) -> Vec<ColorCategory> {
        let mut rng = StdRng::seed_from_u64(11);
        dominant_categories(samples, &DetectionConfig::default(), &mut rng)
    }

    #[test]
    fn test_cluster_count() {
        assert_eq!(cluster_count(2), 2);
        assert_eq!(cluster_count(100), 3);
        assert_eq!(cluster_count(1400), 4);
        assert_eq!(cluster_count(3500), 10);
        assert_eq!(cluster_count(100_000), 10);
    }

    #[test]
    fn test_no_samples() {
        assert!(detect(&[]).is_empty());
    }

    #[test]
    fn test_single_color() {
        assert_eq!(detect(&repeat(GREEN, 500)), vec![ColorCategory::Green]);
    }

    #[test]
    fn test_two_colors_ranked_by_size() {
        let mut samples = repeat(BLUE, 700);
        samples.extend(repeat(RED, 300));

        assert_eq!(detect(&samples), vec![ColorCategory::Blue, ColorCategory::Red]);
    }

    #[test]
    fn test_noise_clusters_are_merged() {
        let mut samples = repeat(RED, 495);
        samples.extend(repeat(BLUE, 495));
        samples.extend(repeat(YELLOW, 10));

        let found = detect(&samples);
        assert_eq!(found.len(), 2);
        assert!(found.contains(&ColorCategory::Red));
        assert!(found.contains(&ColorCategory::Blue));
    }

    #[test]
    fn test_saturation_outweighs_size() {
        // 45% vivid red vs 55% gray: chroma weighting puts red first
        let mut samples = repeat(RED, 450);
        samples.extend(repeat([128, 128, 128], 550));

        assert_eq!(detect(&samples)[0], ColorCategory::Red);
    }

    #[test]
    fn test_top_categories_limit() {
        let mut samples = Vec::new();
        for category in ColorCategory::ALL {
            samples.extend(repeat(category.anchor(), 400));
        }
        let config = DetectionConfig {
            top_categories: 3,
            ..DetectionConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(dominant_categories(&samples, &config, &mut rng).len(), 3);
    }

    #[test]
    fn test_merge_keeps_largest_when_nothing_survives() {
        let clusters = vec![
            Cluster { centroid: Lab::default(), members: vec![0] },
            Cluster { centroid: Lab { l: 50.0, a: 0.0, b: 0.0 }, members: vec![1, 2] },
        ];
        let merged = merge_small_clusters(clusters, 100, 0.5);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].members.len(), 3);
    }
}
