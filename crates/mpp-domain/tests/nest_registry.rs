//! Registry handles and nest definition across ranks.

use mpp_core::{DomainError, Extent, HaloWidths, Layout};
use mpp_domain::{CoarseWindow, DomainId, DomainRegistry, DomainSpec, NestSpec};
use mpp_test_utils::run_spmd;

fn nest(fine: DomainId, coarse: DomainId, icount: i32) -> NestSpec {
    NestSpec {
        fine,
        coarse,
        tile_fine: 1,
        tile_coarse: 0,
        window: CoarseWindow {
            istart: 10,
            icount,
            jstart: 10,
            jcount: 8,
        },
        refine: (3, 3),
        extra_halo: 2,
        npes_nest_tile: vec![2, 2],
    }
}

#[test]
fn nest_window_must_fit_fine_domain() {
    let out = run_spmd(2, |ctx| {
        let mut reg = DomainRegistry::new();
        let coarse = reg
            .define_domain(
                ctx,
                &DomainSpec::new(Extent::new(1, 48, 1, 48), Layout::new(2, 1))
                    .with_halo(HaloWidths::uniform(1))
                    .with_name("coarse"),
            )
            .unwrap();
        let fine = reg
            .define_domain(
                ctx,
                &DomainSpec::new(Extent::new(1, 24, 1, 24), Layout::new(1, 2)).with_name("fine"),
            )
            .unwrap();

        let ok = reg.define_nest_domain(nest(fine, coarse, 8)).unwrap();
        let n = reg.nest_domain(ok).unwrap();
        assert_eq!(n.window(), Extent::new(10, 17, 10, 17));
        assert_eq!(n.coarse_to_fine(17, 17), Extent::new(22, 24, 22, 24));

        reg.define_nest_domain(nest(fine, coarse, 9)).unwrap_err()
    })
    .unwrap();

    for err in out {
        assert_eq!(
            err,
            DomainError::NestExtentMismatch {
                axis: "x",
                required: 27,
                available: 24
            }
        );
    }
}

#[test]
fn destroyed_domain_handle_is_detected() {
    run_spmd(2, |ctx| {
        let mut reg = DomainRegistry::new();
        let spec = DomainSpec::new(Extent::new(1, 8, 1, 8), Layout::new(2, 1));
        let id = reg.define_domain(ctx, &spec).unwrap();
        assert!(reg.domain(id).is_ok());
        reg.destroy_domain(id).unwrap();
        let again = reg.define_domain(ctx, &spec).unwrap();
        assert_ne!(id, again);
        assert!(matches!(
            reg.domain(id),
            Err(DomainError::UninitializedDomain { handle }) if handle == id.to_raw()
        ));
        assert!(matches!(
            reg.domain_mut(id),
            Err(DomainError::UninitializedDomain { .. })
        ));
    })
    .unwrap();
}
