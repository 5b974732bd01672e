use colored::*;
use std::fmt;
use std::ops::Range;
use mf_structure::PairTable;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NearestNeighborLoop {
    Hairpin {
        closing: (usize, usize), // (i, j)
    },
    Interior {
        closing: (usize, usize),
        inner: (usize, usize),
    },
    Multibranch {
        closing: (usize, usize),
        //NOTE: this list must ALWAYS be in 5'->3' order.
        branches: Vec<(usize, usize)>,
    },
    Exterior {
        //NOTE: this list must ALWAYS be in 5'->3' order.
        branches: Vec<(usize, usize)>,
    },
}

impl fmt::Display for NearestNeighborLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NearestNeighborLoop::Hairpin { closing: (i, j) } => {
                write!(f, "{} ({}, {})", "Hairpin loop".red().bold(), i, j)
            }
            NearestNeighborLoop::Interior { closing: (i, j), inner: (p, q) } => {
                write!(f, "{} ({}, {}), ({}, {})", "Interior loop".blue().bold(), i, j, p, q)
            }
            NearestNeighborLoop::Multibranch { closing: (i, j), branches } => {
                write!(f, "{} ({}, {}), ({} branches)", "Multibranch".green().bold(), i, j, branches.len())
            }
            NearestNeighborLoop::Exterior { branches } => {
                write!(f, "{} ({} branches)", "Exterior loop".cyan().bold(), branches.len())
            }
        }
    }
}

impl NearestNeighborLoop {
    pub fn classify(
        closing: Option<(usize, usize)>,
        branches: Vec<(usize, usize)>,
    ) -> Self {
        match closing {
            None => Self::Exterior { branches },
            Some((i, j)) => match branches.len() {
                0 => Self::Hairpin { closing: (i, j) },
                1 => Self::Interior { closing: (i, j), inner: branches[0] },
                _ => Self::Multibranch { closing: (i, j), branches },
            },
        }
    }

    pub fn closing(&self) -> Option<(usize, usize)> {
        match self { Self::Hairpin { closing }
            | Self::Interior { closing, .. }
            | Self::Multibranch { closing, .. } => Some(*closing),
            Self::Exterior { .. } => None,
        }
    }

    fn unpaired_ranges(&self, len: usize) -> Vec<Range<usize>> {
        match self {
            Self::Hairpin { closing: (i, j) } => {
                vec![(*i + 1..*j)]
            },
            Self::Interior { closing: (i, j),  inner: (p, q) } => {
                vec![(*i + 1)..(*p), (*q + 1)..(*j)]
            },
            Self::Multibranch { closing: (i, j), branches } => {
                let mut result = vec![];
                let mut start = *i;
                for &(p, q) in branches {
                    result.push((start+1)..p);
                    start = q;
                }
                result.push((start+1)..(*j));
                result
            }
            Self::Exterior { branches } => {
                let mut result = Vec::new();
                let mut start = 0;
                for &(p, q) in branches {
                    result.push(start..p);
                    start = q+1;
                }
                result.push(start..len);
                result
            }
        }
    }

    /// Number of unpaired positions inside this loop.
    pub fn unpaired_count(&self, len: usize) -> usize {
        self.unpaired_ranges(len)
            .into_iter()
            .map(|r| r.len())
            .sum()
    }
}

pub trait LoopDecomposition {
    fn for_each_loop<F: FnMut(&NearestNeighborLoop)>(&self, f: F);

    fn loops(&self) -> Vec<NearestNeighborLoop> {
        let mut out = Vec::new();
        self.for_each_loop(|l| out.push(l.clone()));
        out
    }
}

impl LoopDecomposition for PairTable {
    fn for_each_loop<F: FnMut(&NearestNeighborLoop)>(&self, mut f: F) {
        fn recurse<F: FnMut(&NearestNeighborLoop)>(
            pt: &PairTable,
            closing: Option<(usize, usize)>,
            f: &mut F,
        ) {
            let mut branches = Vec::new();

            let (mut p, j) = if let Some((i, j)) = closing {
                (i + 1, j)
            } else {
                (0, pt.len())
            };

            while p < j {
                if let Some(q) = pt[p] {
                    assert!(q > p);
                    branches.push((p, q));
                    // Recurse into child loop
                    recurse(pt, Some((p, q)), f);
                    p = q + 1;
                } else {
                    p += 1;
                }
            }
            f(&NearestNeighborLoop::classify(closing, branches));
        }
        recurse(self, None, &mut f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose_loops_empty() {
        let dbn = "......."; // all unpaired -> exterior loop only
        let eloop = NearestNeighborLoop::Exterior {
            branches: vec![],
        };

        let loops = PairTable::try_from(dbn).expect("valid").loops();
        assert_eq!(loops, vec![eloop]);
    }

    #[test]
    fn test_decompose_loops_hairpin() {
        let dbn = ".(...).";
        let eloop = NearestNeighborLoop::Exterior {
            branches: vec![(1, 5)],
        };
        let hloop = NearestNeighborLoop::Hairpin {
            closing: (1, 5)
        };
        let loops = PairTable::try_from(dbn).expect("valid").loops();
        assert!(loops.len() == 2);
        assert!(loops.contains(&eloop));
        assert!(loops.contains(&hloop));
    }

    #[test]
    fn test_decompose_loops_interior_and_multibranch() {
        let dbn = "((...)(...))";
        let loops = PairTable::try_from(dbn).expect("valid").loops();
        assert!(loops.contains(&NearestNeighborLoop::Multibranch {
            closing: (0, 11),
            branches: vec![(1, 5), (6, 10)],
        }));

        let dbn = "(.(...).)";
        let loops = PairTable::try_from(dbn).expect("valid").loops();
        assert!(loops.contains(&NearestNeighborLoop::Interior {
            closing: (0, 8),
            inner: (2, 6),
        }));
    }

    #[test]
    fn test_unpaired_counts() {
        let hloop = NearestNeighborLoop::Hairpin { closing: (1, 5) };
        assert_eq!(hloop.unpaired_count(10), 3);

        let iloop = NearestNeighborLoop::Interior { closing: (1, 9), inner: (3, 7) };
        assert_eq!(iloop.unpaired_count(12), 2);

        let mloop = NearestNeighborLoop::Multibranch {
            closing: (1, 15),
            branches: vec![(2, 4), (5, 9)],
        };
        assert_eq!(mloop.unpaired_count(26), 5);

        let eloop = NearestNeighborLoop::Exterior {
            branches: vec![(1, 5), (6, 11)],
        };
        assert_eq!(eloop.unpaired_count(26), 15);
    }

    #[test]
    fn test_decompose_loops_wild() {
        let dbn = ".(.((...))()((()))).((...()))";
        let loops = PairTable::try_from(dbn).expect("valid").loops();
        // one loop per pair plus the exterior loop
        let pairs = dbn.chars().filter(|&c| c == '(').count();
        assert_eq!(loops.len(), pairs + 1);
    }
}
