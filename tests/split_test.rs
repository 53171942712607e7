//! Property tests for the stratified splitter.

use mailroom::ml::{Category, StratifiedSplit};

fn labels(counts: &[(Category, usize)]) -> Vec<Category> {
    // Interleave classes so that row order does not follow labels.
    let mut remaining: Vec<(Category, usize)> = counts.to_vec();
    let mut out = Vec::new();
    while remaining.iter().any(|(_, n)| *n > 0) {
        for (category, n) in remaining.iter_mut() {
            if *n > 0 {
                out.push(*category);
                *n -= 1;
            }
        }
    }
    out
}

#[test]
fn test_same_seed_same_partition() {
    let y = labels(&[
        (Category::BillingIssue, 12),
        (Category::LoginIssue, 9),
        (Category::IntegrationQuery, 5),
        (Category::GeneralQuery, 20),
    ]);
    let splitter = StratifiedSplit::new(0.3, 42).unwrap();
    assert_eq!(splitter.split(&y).unwrap(), splitter.split(&y).unwrap());
}

#[test]
fn test_different_seeds_differ() {
    let y = labels(&[(Category::BillingIssue, 30), (Category::LoginIssue, 30)]);
    let a = StratifiedSplit::new(0.3, 1).unwrap().split(&y).unwrap();
    let b = StratifiedSplit::new(0.3, 2).unwrap().split(&y).unwrap();
    assert_ne!(a.test, b.test);
}

#[test]
fn test_class_proportions_are_preserved() {
    let counts = [
        (Category::BillingIssue, 12),
        (Category::LoginIssue, 9),
        (Category::IntegrationQuery, 5),
        (Category::GeneralQuery, 20),
    ];
    let y = labels(&counts);
    let fraction = 0.3;
    let split = StratifiedSplit::new(fraction, 42).unwrap().split(&y).unwrap();

    for (category, total) in counts {
        let in_test = split.test.iter().filter(|&&i| y[i] == category).count();
        let in_train = split.train.iter().filter(|&&i| y[i] == category).count();
        assert_eq!(in_test + in_train, total);
        // Sharing out the overall total moves a class by less than a row.
        assert!(
            (in_test as f64 - fraction * total as f64).abs() < 1.0,
            "{category}: {in_test} of {total}"
        );
    }
}

#[test]
fn test_overall_test_share_matches_fraction() {
    let y = labels(&[
        (Category::BillingIssue, 5),
        (Category::LoginIssue, 5),
        (Category::IntegrationQuery, 5),
        (Category::GeneralQuery, 5),
    ]);
    let split = StratifiedSplit::new(0.3, 42).unwrap().split(&y).unwrap();
    assert_eq!(split.test_len(), 6);
    assert_eq!(split.train_len(), 14);

    let y = labels(&[
        (Category::BillingIssue, 15),
        (Category::LoginIssue, 15),
        (Category::IntegrationQuery, 15),
        (Category::GeneralQuery, 15),
    ]);
    let split = StratifiedSplit::new(0.1, 42).unwrap().split(&y).unwrap();
    assert_eq!(split.test_len(), 6);

    let y = labels(&[
        (Category::BillingIssue, 12),
        (Category::LoginIssue, 9),
        (Category::IntegrationQuery, 5),
        (Category::GeneralQuery, 20),
    ]);
    let split = StratifiedSplit::new(0.3, 42).unwrap().split(&y).unwrap();
    assert_eq!(split.test_len(), 14);
}

#[test]
fn test_every_class_on_both_sides() {
    let y = labels(&[
        (Category::BillingIssue, 3),
        (Category::LoginIssue, 3),
        (Category::IntegrationQuery, 2),
        (Category::GeneralQuery, 2),
    ]);
    let split = StratifiedSplit::new(0.3, 42).unwrap().split(&y).unwrap();

    assert_eq!(split.test_len(), 4);
    assert_eq!(split.train_len(), 6);
    for category in Category::ALL {
        assert!(split.test.iter().any(|&i| y[i] == category));
        assert!(split.train.iter().any(|&i| y[i] == category));
    }
}

#[test]
fn test_indices_sorted_and_disjoint() {
    let y = labels(&[(Category::BillingIssue, 7), (Category::GeneralQuery, 8)]);
    let split = StratifiedSplit::new(0.4, 9).unwrap().split(&y).unwrap();

    assert!(split.train.windows(2).all(|w| w[0] < w[1]));
    assert!(split.test.windows(2).all(|w| w[0] < w[1]));
    assert!(split.test.iter().all(|i| !split.train.contains(i)));
    assert_eq!(split.train_len() + split.test_len(), y.len());
}
