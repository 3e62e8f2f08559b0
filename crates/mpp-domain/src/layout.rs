//! Choosing a processor layout for a division count.

use log::debug;
use mpp_core::{DomainError, DomainResult, Extent, Layout};

/// Pick the `x * y == ndivs` layout whose sub-rectangles are closest to
/// square.
///
/// Every factor pair that leaves each division at least one cell is a
/// candidate. The winner minimizes the sub-rectangle perimeter-to-area
/// ratio; ties go to the squarer sub-rectangle, then to the smaller `x`.
///
/// # Examples
///
/// ```
/// use mpp_core::{Extent, Layout};
/// use mpp_domain::solve_layout;
///
/// let global = Extent::new(1, 100, 1, 100);
/// assert_eq!(solve_layout(&global, 4).unwrap(), Layout::new(2, 2));
///
/// // Prime counts follow the aspect ratio.
/// let wide = Extent::new(1, 360, 1, 90);
/// assert_eq!(solve_layout(&wide, 7).unwrap(), Layout::new(7, 1));
/// ```
pub fn solve_layout(global: &Extent, ndivs: i32) -> DomainResult<Layout> {
    if ndivs <= 0 {
        return Err(DomainError::InvalidLayout {
            reason: format!("division count must be positive, got {ndivs}"),
        });
    }
    if global.is_degenerate() {
        return Err(DomainError::InvalidLayout {
            reason: format!("extent {global} has no cells"),
        });
    }
    let nx = global.x_len() as u64;
    let ny = global.y_len() as u64;
    let n = ndivs as u64;

    let mut best: Option<(u64, u64)> = None;
    for x in (1..=n).filter(|x| n % x == 0) {
        let y = n / x;
        if x > nx || y > ny {
            continue;
        }
        best = match best {
            None => Some((x, y)),
            Some(b) if better((x, y), b, nx, ny) => Some((x, y)),
            keep => keep,
        };
    }

    match best {
        Some((x, y)) => {
            let layout = Layout::new(x as u32, y as u32);
            debug!("layout for {ndivs} divisions over {global}: {layout}");
            Ok(layout)
        }
        None => Err(DomainError::InvalidLayout {
            reason: format!("{ndivs} divisions cannot tile {global} with non-empty pieces"),
        }),
    }
}

/// Whether candidate `a` beats incumbent `b`.
///
/// Perimeter over area of an `(nx/x) by (ny/y)` piece is proportional to
/// `x*ny + y*nx`. Aspect is compared as the fraction
/// `max(nx*y, ny*x) / min(nx*y, ny*x)` without dividing.
fn better(a: (u64, u64), b: (u64, u64), nx: u64, ny: u64) -> bool {
    let cost = |(x, y): (u64, u64)| x * ny + y * nx;
    let (ca, cb) = (cost(a), cost(b));
    if ca != cb {
        return ca < cb;
    }
    let aspect = |(x, y): (u64, u64)| {
        let (p, q) = (nx * y, ny * x);
        (p.max(q) as u128, p.min(q) as u128)
    };
    let ((an, ad), (bn, bd)) = (aspect(a), aspect(b));
    let (lhs, rhs) = (an * bd, bn * ad);
    if lhs != rhs {
        return lhs < rhs;
    }
    a.0 < b.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid(nx: i32, ny: i32) -> Extent {
        Extent::new(0, nx - 1, 0, ny - 1)
    }

    #[test]
    fn one_division_is_one_by_one() {
        assert_eq!(solve_layout(&grid(17, 3), 1).unwrap(), Layout::new(1, 1));
    }

    #[test]
    fn square_count_on_square_grid() {
        assert_eq!(solve_layout(&grid(100, 100), 4).unwrap(), Layout::new(2, 2));
        assert_eq!(solve_layout(&grid(90, 90), 9).unwrap(), Layout::new(3, 3));
        assert_eq!(solve_layout(&grid(64, 64), 16).unwrap(), Layout::new(4, 4));
    }

    #[test]
    fn prime_follows_aspect() {
        assert_eq!(solve_layout(&grid(20, 200), 5).unwrap(), Layout::new(1, 5));
        assert_eq!(solve_layout(&grid(200, 20), 5).unwrap(), Layout::new(5, 1));
    }

    #[test]
    fn tie_goes_to_smaller_x() {
        // 2x1 and 1x2 tie exactly on a square grid; x=1 wins.
        assert_eq!(solve_layout(&grid(10, 10), 2).unwrap(), Layout::new(1, 2));
    }

    #[test]
    fn non_positive_count_rejected() {
        assert!(matches!(
            solve_layout(&grid(10, 10), 0),
            Err(DomainError::InvalidLayout { .. })
        ));
        assert!(solve_layout(&grid(10, 10), -4).is_err());
    }

    #[test]
    fn zero_area_rejected() {
        assert!(matches!(
            solve_layout(&Extent::new(0, -1, 0, 9), 2),
            Err(DomainError::InvalidLayout { .. })
        ));
    }

    #[test]
    fn too_many_divisions_rejected() {
        // 7 is prime and exceeds both axes.
        assert!(solve_layout(&grid(3, 3), 7).is_err());
    }

    proptest! {
        #[test]
        fn solution_divides_and_fits(nx in 1i32..200, ny in 1i32..200, n in 1i32..64) {
            if let Ok(l) = solve_layout(&grid(nx, ny), n) {
                prop_assert_eq!(l.ndivs(), n as usize);
                prop_assert!(l.x as i32 <= nx);
                prop_assert!(l.y as i32 <= ny);
            }
        }

        #[test]
        fn no_candidate_has_lower_cost(nx in 1i32..120, ny in 1i32..120, n in 1i32..48) {
            if let Ok(l) = solve_layout(&grid(nx, ny), n) {
                let (nx, ny, n) = (nx as u64, ny as u64, n as u64);
                let chosen = l.x as u64 * ny + l.y as u64 * nx;
                for x in (1..=n).filter(|x| n % x == 0) {
                    let y = n / x;
                    if x <= nx && y <= ny {
                        prop_assert!(chosen <= x * ny + y * nx);
                    }
                }
            }
        }
    }
}
