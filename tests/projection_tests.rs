mod support;

use polycast::backend::bsp::{shapes, BspBackend, Solid};
use polycast::backend::{FacetCycle, FailureBehaviour, GeometryBackend, HalfFacet, ShellVisitor};
use polycast::eval::{
    EvaluatedChild, Evaluator, Flattener, LinearExtrudeParams, ProjectionParams,
};
use polycast::float_types::{Real, TAU};
use polycast::nef::NefSolid;
use nalgebra::{Point3, Vector3};

use crate::support::{
    approx_eq, signed_area_xy, tetrahedron, unit_square_contours, FailingBackend,
};

fn child_of<B: GeometryBackend>(solid: B::Nef3) -> Vec<EvaluatedChild<B>> {
    vec![EvaluatedChild::new(NefSolid::from_nef3(solid))]
}

fn cut_params() -> ProjectionParams {
    ProjectionParams {
        cut_mode: true,
        convexity: 2,
    }
}

#[test]
fn cut_projection_of_a_unit_cube_is_the_unit_square() {
    let backend = BspBackend::new();
    let evaluator = Evaluator::new(&backend);

    let ps = evaluator
        .project(&cut_params(), &child_of(shapes::cube(1.0)))
        .expect("projection produced a PolySet");

    assert_eq!(ps.convexity, 2);
    assert!(!ps.is_empty());
    assert!(ps.polygons.iter().all(|p| p.iter().all(|v| v.z == 0.0)));

    // The section is the unit square, triangulated facing up.
    assert!(approx_eq(signed_area_xy(&ps), 1.0, 1e-9));
    let bb = ps.bounding_box();
    assert!(approx_eq(bb.mins.x, 0.0, 1e-9) && approx_eq(bb.maxs.x, 1.0, 1e-9));
    assert!(approx_eq(bb.mins.y, 0.0, 1e-9) && approx_eq(bb.maxs.y, 1.0, 1e-9));
}

#[test]
fn cut_projection_unions_the_children_first() {
    let backend = BspBackend::new();
    let evaluator = Evaluator::new(&backend);

    // Two overlapping boxes straddling z=0 project to a 2×1 rectangle.
    let children = vec![
        EvaluatedChild::new(NefSolid::from_nef3(shapes::cuboid(
            Point3::new(0.0, 0.0, -0.5),
            Point3::new(1.0, 1.0, 0.5),
        ))),
        EvaluatedChild::new(NefSolid::from_nef3(shapes::cuboid(
            Point3::new(0.5, 0.0, -0.5),
            Point3::new(2.0, 1.0, 0.5),
        ))),
    ];

    let ps = evaluator
        .project(&cut_params(), &children)
        .expect("projection produced a PolySet");

    assert!(approx_eq(signed_area_xy(&ps), 2.0, 1e-9));
    let bb = ps.bounding_box();
    assert!(approx_eq(bb.mins.x, 0.0, 1e-9) && approx_eq(bb.maxs.x, 2.0, 1e-9));
    assert!(approx_eq(bb.mins.y, 0.0, 1e-9) && approx_eq(bb.maxs.y, 1.0, 1e-9));
}

#[test]
fn cut_projection_of_a_drilled_cube_is_an_annulus() {
    let backend = BspBackend::new();
    let evaluator = Evaluator::new(&backend);

    // A cube straddling z=0 with a cylindrical hole drilled through it.
    let cube = shapes::cuboid(Point3::new(0.0, 0.0, -0.5), Point3::new(1.0, 1.0, 0.5));
    let segments = 16usize;
    let drill = shapes::cylinder(0.25, -1.0, 1.0, segments);
    let drill = {
        // Center the drill on the cube.
        let Solid::Mesh(polys) = drill else {
            panic!("cylinder is a mesh")
        };
        Solid::Mesh(
            polys
                .into_iter()
                .filter_map(|p| {
                    polycast::backend::bsp::polygon::Polygon::new(
                        p.vertices
                            .iter()
                            .map(|v| Point3::new(v.x + 0.5, v.y + 0.5, v.z))
                            .collect(),
                    )
                })
                .collect(),
        )
    };
    let drilled = backend.difference(&cube, &drill).expect("difference");

    let ps = evaluator
        .project(&cut_params(), &child_of(drilled))
        .expect("projection produced a PolySet");

    // Area of the square minus the sampled circle.
    let circle_area = 0.5 * segments as Real * 0.25 * 0.25 * (TAU / segments as Real).sin();
    assert!(approx_eq(signed_area_xy(&ps), 1.0 - circle_area, 1e-4));
}

#[test]
fn flattener_unions_outer_cycles_and_subtracts_holes() {
    let backend = BspBackend::new();
    let mut flattener = Flattener::new(&backend);

    let ring = |pts: &[(Real, Real)]| {
        FacetCycle::Edges(
            pts.iter()
                .map(|&(x, y)| Point3::new(x, y, 0.0))
                .collect(),
        )
    };
    flattener.half_facet(&HalfFacet {
        orthogonal_direction: Vector3::z(),
        cycles: vec![
            ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]),
            ring(&[(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)]),
            FacetCycle::Trivial,
        ],
    });
    // The downward partner facet must not contribute.
    flattener.half_facet(&HalfFacet {
        orthogonal_direction: -Vector3::z(),
        cycles: vec![ring(&[(0.0, 0.0), (40.0, 0.0), (40.0, 40.0), (0.0, 40.0)])],
    });

    let ps = backend.nef2_to_polyset(&flattener.into_region());
    assert!(approx_eq(signed_area_xy(&ps), 12.0, 1e-9));
}

#[test]
fn shadow_projection_of_a_prism_skips_vertical_walls() {
    let backend = BspBackend::new();
    let evaluator = Evaluator::new(&backend);

    // A triangular prism: every side wall is vertical and degenerates in
    // projection, leaving the caps' footprint.
    let triangle = support::contour_set(&[(
        vec![(0.0, 0.0), (0.0, 1.0), (1.0, 0.0)],
        true,
        false,
    )]);
    let prism = evaluator.extrude_contours(
        &LinearExtrudeParams {
            height: 2.0,
            center: true,
            ..Default::default()
        },
        &triangle,
    );

    let params = ProjectionParams {
        cut_mode: false,
        convexity: 1,
    };
    let ps = evaluator
        .project(&params, &child_of(Solid::from_polyset(&prism)))
        .expect("shadow projection produced a PolySet");

    assert!(approx_eq(signed_area_xy(&ps), 0.5, 1e-9));
}

#[test]
fn shadow_projection_of_a_tetrahedron_is_its_top_face() {
    let backend = BspBackend::new();
    let evaluator = Evaluator::new(&backend);

    let params = ProjectionParams {
        cut_mode: false,
        convexity: 1,
    };
    let ps = evaluator
        .project(&params, &child_of(tetrahedron()))
        .expect("shadow projection produced a PolySet");

    // The apex projects inside the top face, so the silhouette equals the
    // top face's projection (area 6).
    assert!(approx_eq(signed_area_xy(&ps), 6.0, 1e-9));
    assert!(ps.polygons.iter().all(|p| p.iter().all(|v| v.z == 0.0)));
}

#[test]
fn extrusion_round_trips_through_cut_projection() {
    let backend = BspBackend::new();
    let evaluator = Evaluator::new(&backend);

    let prism = evaluator.extrude_contours(
        &LinearExtrudeParams {
            height: 1.0,
            center: true,
            ..Default::default()
        },
        &unit_square_contours(),
    );

    let ps = evaluator
        .project(&cut_params(), &child_of(Solid::from_polyset(&prism)))
        .expect("projection produced a PolySet");

    assert!(approx_eq(signed_area_xy(&ps), 1.0, 1e-9));
    let bb = ps.bounding_box();
    assert!(approx_eq(bb.mins.x, 0.0, 1e-9) && approx_eq(bb.maxs.x, 1.0, 1e-9));
}

#[test]
fn projection_is_idempotent() {
    let backend = BspBackend::new();
    let evaluator = Evaluator::new(&backend);

    let once = evaluator
        .project(&cut_params(), &child_of(shapes::cube(1.0)))
        .expect("first projection");

    // Lift the projected shape back to a unit prism and project again.
    let lifted = evaluator.extrude_contours(
        &LinearExtrudeParams {
            height: 1.0,
            center: true,
            ..Default::default()
        },
        &unit_square_contours(),
    );
    let twice = evaluator
        .project(&cut_params(), &child_of(Solid::from_polyset(&lifted)))
        .expect("second projection");

    assert!(approx_eq(
        signed_area_xy(&once),
        signed_area_xy(&twice),
        1e-9
    ));
}

#[test]
fn non_manifold_body_yields_an_empty_shadow() {
    let backend = BspBackend::new();
    let evaluator = Evaluator::new(&backend);

    // A single floating triangle is not a 2-manifold.
    let sheet = Solid::from_polygons(
        [vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]]
        .into_iter()
        .filter_map(polycast::backend::bsp::polygon::Polygon::new)
        .collect(),
    );

    let params = ProjectionParams {
        cut_mode: false,
        convexity: 3,
    };
    let ps = evaluator
        .project(&params, &child_of(sheet))
        .expect("an empty PolySet, not null");
    assert!(ps.is_empty());
    assert_eq!(ps.convexity, 3);
}

#[test]
fn projection_of_no_children_is_null() {
    let backend = BspBackend::new();
    let evaluator = Evaluator::new(&backend);
    assert!(evaluator.project(&cut_params(), &[]).is_none());
}

#[test]
fn failed_plane_intersection_falls_back_to_the_thin_slab() {
    let backend = FailingBackend::new(false);
    let evaluator = Evaluator::new(&backend);

    assert_eq!(backend.error_behaviour(), FailureBehaviour::Abort);
    let ps = evaluator
        .project(&cut_params(), &child_of(shapes::cube(1.0)))
        .expect("slab fallback produced a PolySet");

    // The slab cap sits at z=±0.001; its section is still the unit square.
    assert!(approx_eq(signed_area_xy(&ps), 1.0, 1e-4));
    // The failure policy is restored on the way out.
    assert_eq!(backend.error_behaviour(), FailureBehaviour::Abort);
}

#[test]
fn failed_fallback_returns_null_and_restores_the_policy() {
    let backend = FailingBackend::new(true);
    let evaluator = Evaluator::new(&backend);

    let before = backend.error_behaviour();
    assert!(evaluator
        .project(&cut_params(), &child_of(shapes::cube(1.0)))
        .is_none());
    assert_eq!(backend.error_behaviour(), before);
}

#[test]
fn render_converts_solids_and_regions() {
    let backend = BspBackend::new();
    let evaluator = Evaluator::new(&backend);

    let ps = evaluator
        .render(&NefSolid::from_nef3(shapes::cube(2.0)), 4)
        .expect("render of a cube");
    assert!(!ps.is_empty());
    assert_eq!(ps.convexity, 4);

    // Empty solids render to null.
    assert!(evaluator.render(&NefSolid::<BspBackend>::empty(), 1).is_none());
}

#[test]
fn render_still_converts_non_manifold_bodies() {
    let backend = BspBackend::new();
    let evaluator = Evaluator::new(&backend);

    let sheet = Solid::from_polygons(
        [vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]]
        .into_iter()
        .filter_map(polycast::backend::bsp::polygon::Polygon::new)
        .collect(),
    );

    // Warned about, but converted anyway.
    let ps = evaluator
        .render(&NefSolid::from_nef3(sheet), 1)
        .expect("best-effort conversion");
    assert_eq!(ps.polygons.len(), 1);
}

#[test]
fn walking_a_section_visits_both_facet_sides() {
    // The section walker must emit paired up/down facets so the flattener
    // can skip the downward partner.
    struct Counter {
        up: usize,
        down: usize,
    }
    impl ShellVisitor for Counter {
        fn half_facet(&mut self, facet: &HalfFacet) {
            if facet.orthogonal_direction == Vector3::z() {
                self.up += 1;
            } else if facet.orthogonal_direction == -Vector3::z() {
                self.down += 1;
            }
            for cycle in &facet.cycles {
                if let FacetCycle::Edges(points) = cycle {
                    assert!(points.iter().all(|p| p.z == 0.0));
                }
            }
        }
    }

    let backend = BspBackend::new();
    let section = backend
        .plane_intersection(&shapes::cuboid(
            Point3::new(0.0, 0.0, -1.0),
            Point3::new(1.0, 1.0, 1.0),
        ))
        .expect("plane intersection");

    let mut counter = Counter { up: 0, down: 0 };
    backend
        .walk_shells(&section, &mut counter)
        .expect("walk succeeds");
    assert_eq!(counter.up, 1);
    assert_eq!(counter.down, 1);
}
