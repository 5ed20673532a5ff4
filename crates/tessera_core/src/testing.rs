//! Fixture tilesets for tests
//!
//! Rebuilds the two tilesets shipped with the game: `tilepack` (12px tiles, one
//! edge Wang set named "Float") and `main` (16px tiles, rectangle and polygon
//! colliders, corner/mixed/edge Wang sets).

use crate::{
    CollisionObject, Color, Shape, Tile, Tileset, WangColor, WangId, WangSet, WangSetType,
};

fn wang_set(name: &str, set_type: WangSetType, tiles: &[(u32, &str)]) -> WangSet {
    let mut set = WangSet::new(name, set_type);
    set.add_color(WangColor::new(name, Color::RED));
    for &(tile, wang_id) in tiles {
        let id: WangId = wang_id.parse().expect("fixture wangid");
        set.set_tile_wang_id(tile, id);
    }
    set
}

fn rect_tile(id: u32, x: f32, y: f32, width: f32, height: f32) -> Tile {
    Tile::new(id).with_collision(vec![CollisionObject::new(
        1,
        Shape::rectangle(x, y, width, height),
    )])
}

fn polygon_tile(id: u32, anchor: [f32; 2], points: &[[f32; 2]]) -> Tile {
    Tile::new(id).with_collision(vec![CollisionObject::new(
        1,
        Shape::polygon(anchor, points.to_vec()),
    )])
}

/// The "Float" edge set of `tilepack.tsx`
pub fn float_wang_set() -> WangSet {
    wang_set(
        "Float",
        WangSetType::Edge,
        &[
            (0, "0,0,1,0,1,0,0,0"),
            (1, "0,0,1,0,1,0,1,0"),
            (2, "0,0,0,0,1,0,1,0"),
            (3, "0,0,0,0,1,0,0,0"),
            (16, "1,0,1,0,1,0,0,0"),
            (17, "1,0,1,0,1,0,1,0"),
            (18, "1,0,0,0,1,0,1,0"),
            (19, "1,0,0,0,1,0,0,0"),
            (32, "1,0,1,0,0,0,0,0"),
            (33, "1,0,1,0,0,0,1,0"),
            (34, "1,0,0,0,0,0,1,0"),
            (35, "1,0,0,0,0,0,0,0"),
            (48, "0,0,1,0,0,0,0,0"),
            (49, "0,0,1,0,0,0,1,0"),
            (50, "0,0,0,0,0,0,1,0"),
        ],
    )
}

/// `tilepack.tsx`: 64 tiles of 12x12, full-tile colliders on the Float tiles
pub fn float_tileset() -> Tileset {
    let mut tileset =
        Tileset::new("tilepack", 12, 12, 16, 64).with_image("tilepack.png", 192, 48);
    for id in [0, 1, 2, 3, 16, 17, 18, 19, 32, 33, 34, 35, 48, 49, 50, 51] {
        tileset.insert_tile(rect_tile(id, 0.0, 0.0, 12.0, 12.0));
    }
    tileset.with_wang_set(float_wang_set())
}

/// `main.tsx`: 1024 tiles of 16x16 with slopes and partial blocks
pub fn main_tileset() -> Tileset {
    let mut tileset = Tileset::new("main", 16, 16, 32, 1024).with_image("tilemap.png", 512, 512);

    for id in [0, 2, 3, 35, 64, 66, 67, 96, 97, 98, 99] {
        tileset.insert_tile(rect_tile(id, 0.0, 0.0, 16.0, 16.0));
    }
    tileset.insert_tile(rect_tile(1, 0.0, 0.0, 16.0, 10.0));
    tileset.insert_tile(rect_tile(32, 0.0, 0.0, 10.0, 16.0));
    tileset.insert_tile(rect_tile(34, 7.0, 0.0, 9.0, 16.0));
    tileset.insert_tile(rect_tile(65, 0.0, 7.0, 16.0, 9.0));

    let polygons: &[(u32, [f32; 2], &[[f32; 2]])] = &[
        (69, [0.0, 16.0], &[[0.0, 0.0], [16.0, -16.0], [16.0, 0.0]]),
        (70, [0.0, 16.0], &[[0.0, 0.0], [16.0, 0.0], [0.0, -16.0]]),
        (101, [0.0, 0.0], &[[0.0, 0.0], [16.0, 0.0], [16.0, 16.0]]),
        (102, [0.0, 16.0], &[[0.0, 0.0], [16.0, -16.0], [0.0, -16.0]]),
        (
            322,
            [0.0, 0.0],
            &[[0.0, 0.0], [8.0, 0.0], [16.0, 4.0], [16.0, 16.0], [0.0, 16.0]],
        ),
        (323, [0.0, 4.0], &[[0.0, 0.0], [16.0, 8.0], [16.0, 12.0], [0.0, 12.0]]),
        (324, [0.0, 12.0], &[[0.0, 0.0], [8.0, 4.0], [0.0, 4.0]]),
        (329, [8.0, 16.0], &[[0.0, 0.0], [8.0, -4.0], [8.0, 0.0]]),
        (330, [0.0, 16.0], &[[0.0, 0.0], [0.0, -4.0], [16.0, -12.0], [16.0, 0.0]]),
        (
            331,
            [0.0, 4.0],
            &[[0.0, 0.0], [8.0, -4.0], [16.0, -4.0], [16.0, 12.0], [0.0, 12.0]],
        ),
        (
            356,
            [8.0, 0.0],
            &[[0.0, 0.0], [8.0, 4.0], [8.0, 16.0], [-8.0, 16.0], [-8.0, 0.0]],
        ),
        (390, [0.0, 0.0], &[[0.0, 0.0], [16.0, 0.0], [16.0, 16.0], [0.0, 16.0]]),
        (391, [0.0, 0.0], &[[0.0, 0.0], [16.0, 0.0], [16.0, 16.0], [0.0, 16.0]]),
    ];
    for (id, anchor, points) in polygons {
        tileset.insert_tile(polygon_tile(*id, *anchor, points));
    }

    tileset.add_wang_set(wang_set(
        "COLLIDER",
        WangSetType::Corner,
        &[
            (29, "0,1,0,0,0,0,0,0"),
            (30, "0,0,0,1,0,0,0,0"),
            (31, "0,1,0,1,0,0,0,0"),
            (60, "0,0,0,0,0,1,0,0"),
            (61, "0,1,0,0,0,1,0,0"),
            (62, "0,0,0,1,0,1,0,0"),
            (63, "0,1,0,1,0,1,0,0"),
            (92, "0,0,0,0,0,0,0,1"),
            (93, "0,1,0,0,0,0,0,1"),
            (94, "0,0,0,1,0,0,0,1"),
            (95, "0,1,0,1,0,0,0,1"),
            (124, "0,0,0,0,0,1,0,1"),
            (125, "0,1,0,0,0,1,0,1"),
            (126, "0,0,0,1,0,1,0,1"),
            (127, "0,1,0,1,0,1,0,1"),
        ],
    ));
    tileset.add_wang_set(wang_set(
        "COLLIDER (mixed)",
        WangSetType::Mixed,
        &[
            (0, "0,0,1,0,1,0,0,0"),
            (1, "0,0,1,0,1,0,1,0"),
            (2, "0,0,0,0,1,0,1,0"),
            (3, "0,0,0,0,1,0,0,0"),
            (4, "0,0,0,0,1,0,1,0"),
            (32, "1,0,1,0,1,0,0,0"),
            (33, "1,0,1,0,1,1,1,0"),
            (34, "1,0,0,0,1,0,1,0"),
            (35, "1,0,0,0,1,0,0,0"),
            (36, "1,0,0,0,0,0,1,0"),
            (64, "1,0,1,0,0,0,0,0"),
            (65, "1,0,1,0,0,0,1,0"),
            (66, "1,0,0,0,0,0,1,0"),
            (67, "1,0,0,0,0,0,0,0"),
            (68, "0,0,1,0,1,0,0,0"),
            (96, "0,0,1,0,0,0,0,0"),
            (97, "0,0,1,0,0,0,1,0"),
            (98, "0,0,0,0,0,0,1,0"),
            (100, "0,0,0,0,1,0,1,0"),
        ],
    ));
    tileset.add_wang_set(wang_set(
        "Unnamed",
        WangSetType::Edge,
        &[
            (0, "0,0,1,0,1,0,0,0"),
            (1, "0,0,1,0,1,0,1,0"),
            (2, "0,0,0,0,1,0,1,0"),
            (3, "0,0,0,0,1,0,0,0"),
            (4, "1,0,1,0,0,0,0,0"),
            (32, "1,0,1,0,1,0,0,0"),
            (34, "1,0,0,0,1,0,1,0"),
            (35, "1,0,0,0,1,0,0,0"),
            (36, "0,0,1,0,1,0,0,0"),
            (64, "1,0,1,0,0,0,0,0"),
            (65, "1,0,1,0,0,0,1,0"),
            (66, "1,0,0,0,0,0,1,0"),
            (67, "1,0,0,0,0,0,0,0"),
            (68, "1,0,0,0,0,0,1,0"),
            (96, "0,0,1,0,0,0,0,0"),
            (97, "0,0,1,0,0,0,1,0"),
            (98, "0,0,0,0,0,0,1,0"),
            (100, "0,0,0,0,1,0,1,0"),
        ],
    ));
    tileset
}
