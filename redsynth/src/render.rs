//! ASCII rendering of schematics, one horizontal layer at a time.

use geometry::cuboid::Cuboid;
use voxel::Schematic;

/// Renders a schematic as stacked y-layers.
///
/// Each layer prints rows of increasing z; within a row, columns are
/// increasing x. Blocks render as the first letter of their kind (after
/// any namespace prefix), empty cells as `.`.
pub fn render_layers(schematic: &Schematic) -> String {
    let Some(bbox) = schematic.bbox() else {
        return String::from("(empty schematic)\n");
    };

    let mut out = String::new();
    for y in Cuboid::min(&bbox).y..=Cuboid::max(&bbox).y {
        out.push_str(&format!("y = {y}\n"));
        for z in Cuboid::min(&bbox).z..=Cuboid::max(&bbox).z {
            for x in Cuboid::min(&bbox).x..=Cuboid::max(&bbox).x {
                let symbol = schematic
                    .get((x, y, z).into())
                    .map(|block| {
                        block
                            .kind
                            .rsplit(':')
                            .next()
                            .and_then(|name| name.chars().next())
                            .unwrap_or('#')
                    })
                    .unwrap_or('.');
                out.push(symbol);
            }
            out.push('\n');
        }
        out.push('\n');
    }
    out
}
