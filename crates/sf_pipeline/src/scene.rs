//! Scene assembler: turns the best layout's clamped footprints and parking
//! solution into a rendering-ready set of typed elements, plus residual
//! greenspace by iterative polygon difference.

use sf_core::geom::{self, MultiPolygon, Polygon};
use sf_core::model::{BuildingSpec, Element, ElementProperties, ElementType, ParkingSolution, Scene};
use sf_core::units::{sqft_to_sqm, sqm_to_sqft};

/// Assemble the scene for one evaluated layout.
pub fn assemble(buildings: &[(BuildingSpec, Polygon)], parking: &ParkingSolution, envelope: &Polygon) -> Scene {
    let mut elements = Vec::new();

    for (spec, footprint) in buildings {
        elements.push(Element {
            id: spec.id.clone(),
            kind: ElementType::Building,
            geometry: footprint.clone(),
            properties: ElementProperties {
                area_sq_ft: sqm_to_sqft(geom::area(footprint)),
                floors: Some(spec.footprint_floors()),
                parking_spaces: None,
            },
        });
    }

    let total_bay_area: f64 = parking.bays.iter().map(geom::area).sum();
    for (i, bay) in parking.bays.iter().enumerate() {
        let share = if total_bay_area > 0.0 {
            (geom::area(bay) / total_bay_area * parking.stalls_achieved as f64).round() as u32
        } else {
            0
        };
        elements.push(Element {
            id: format!("parking-bay-{i}"),
            kind: ElementType::ParkingBay,
            geometry: bay.clone(),
            properties: ElementProperties {
                area_sq_ft: sqm_to_sqft(geom::area(bay)),
                floors: None,
                parking_spaces: Some(share),
            },
        });
    }

    for (i, aisle) in parking.aisles.iter().enumerate() {
        elements.push(Element {
            id: format!("parking-aisle-{i}"),
            kind: ElementType::ParkingAisle,
            geometry: aisle.clone(),
            properties: ElementProperties {
                area_sq_ft: sqm_to_sqft(geom::area(aisle)),
                floors: None,
                parking_spaces: None,
            },
        });
    }

    // Main drive spine first, then any per-aisle connectors; `solve_parking`
    // only ever pushes the single main spine today.
    for (i, circ) in parking.circulation.iter().enumerate() {
        elements.push(Element {
            id: format!("circulation-{i}"),
            kind: ElementType::Circulation,
            geometry: circ.clone(),
            properties: ElementProperties {
                area_sq_ft: sqm_to_sqft(geom::area(circ)),
                floors: None,
                parking_spaces: None,
            },
        });
    }

    for (i, green) in compute_greenspace(buildings, parking, envelope).into_iter().enumerate() {
        elements.push(Element {
            id: format!("greenspace-{i}"),
            kind: ElementType::Greenspace,
            properties: ElementProperties {
                area_sq_ft: sqm_to_sqft(geom::area(&green)),
                floors: None,
                parking_spaces: None,
            },
            geometry: green,
        });
    }

    Scene { elements }
}

/// Iterative polygon difference: envelope minus every building, bay, aisle,
/// and circulation polygon in turn. `geom::difference` never panics on
/// pathological input (the degenerate/overflow case collapses to an empty
/// `MultiPolygon` rather than throwing), so there is no failure path to
/// catch here; a piece below the sliver threshold is simply dropped.
fn compute_greenspace(buildings: &[(BuildingSpec, Polygon)], parking: &ParkingSolution, envelope: &Polygon) -> Vec<Polygon> {
    let mut remaining = MultiPolygon::new(vec![envelope.clone()]);
    for (_, footprint) in buildings {
        remaining = geom::difference(&remaining, &MultiPolygon::new(vec![footprint.clone()]));
    }
    for bay in &parking.bays {
        remaining = geom::difference(&remaining, &MultiPolygon::new(vec![bay.clone()]));
    }
    for aisle in &parking.aisles {
        remaining = geom::difference(&remaining, &MultiPolygon::new(vec![aisle.clone()]));
    }
    for circ in &parking.circulation {
        remaining = geom::difference(&remaining, &MultiPolygon::new(vec![circ.clone()]));
    }

    let min_area_m2 = sqft_to_sqm(sf_core::units::MIN_GREENSPACE_AREA_SQFT);
    remaining.0.into_iter().filter(|p| geom::area(p) >= min_area_m2).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::geom::{rect_polygon, Point2};
    use sf_core::model::{BuildingType, LockedFields};

    fn envelope() -> Polygon {
        rect_polygon(Point2 { x: 0.0, y: 0.0 }, Point2 { x: 100.0, y: 100.0 })
    }

    fn spec() -> BuildingSpec {
        BuildingSpec {
            id: "b1".into(),
            kind: BuildingType::Bar,
            anchor: Point2 { x: 50.0, y: 50.0 },
            rotation_rad: 0.0,
            width_m: Some(20.0),
            depth_m: Some(10.0),
            floors: 3,
            wing_width_m: None,
            wing_depth_m: None,
            courtyard_width_m: None,
            courtyard_depth_m: None,
            podium_floors: None,
            unit_mix: None,
            locked: LockedFields::default(),
        }
    }

    #[test]
    fn building_without_parking_yields_one_building_element_and_greenspace() {
        let footprint = rect_polygon(Point2 { x: 40.0, y: 45.0 }, Point2 { x: 60.0, y: 55.0 });
        let buildings = vec![(spec(), footprint)];
        let scene = assemble(&buildings, &ParkingSolution::default(), &envelope());

        assert_eq!(scene.elements.iter().filter(|e| e.kind == ElementType::Building).count(), 1);
        assert!(scene.elements.iter().any(|e| e.kind == ElementType::Greenspace));
    }

    #[test]
    fn greenspace_sliver_below_threshold_is_dropped() {
        // A building that consumes all but a hairline sliver of the envelope.
        let footprint = rect_polygon(Point2 { x: 0.0, y: 0.0 }, Point2 { x: 100.0, y: 99.999 });
        let buildings = vec![(spec(), footprint)];
        let scene = assemble(&buildings, &ParkingSolution::default(), &envelope());
        assert!(!scene.elements.iter().any(|e| e.kind == ElementType::Greenspace));
    }

    #[test]
    fn parking_bay_stall_share_is_proportional_to_area() {
        let bay_a = rect_polygon(Point2 { x: 0.0, y: 0.0 }, Point2 { x: 10.0, y: 10.0 });
        let bay_b = rect_polygon(Point2 { x: 20.0, y: 0.0 }, Point2 { x: 40.0, y: 10.0 });
        let mut parking = ParkingSolution::default();
        parking.bays = vec![bay_a, bay_b];
        parking.stalls_achieved = 9;
        let scene = assemble(&[], &parking, &envelope());
        let shares: Vec<u32> = scene
            .elements
            .iter()
            .filter(|e| e.kind == ElementType::ParkingBay)
            .filter_map(|e| e.properties.parking_spaces)
            .collect();
        assert_eq!(shares, vec![3, 6]);
    }
}
