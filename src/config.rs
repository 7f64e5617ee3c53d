use crate::ship::ShipClass;

pub const BOARD_SIZE: u8 = 10;
pub const NUM_SHIP_CLASSES: usize = 4;
/// Standard fleet: one size-4, two size-3, three size-2, four size-1.
pub const FLEET_CLASSES: [ShipClass; NUM_SHIP_CLASSES] = [
    ShipClass::new(4, 1),
    ShipClass::new(3, 2),
    ShipClass::new(2, 3),
    ShipClass::new(1, 4),
];
/// Cells covered by a complete fleet (1*4 + 2*3 + 3*2 + 4*1).
pub const TOTAL_SHIP_CELLS: usize = 20;
