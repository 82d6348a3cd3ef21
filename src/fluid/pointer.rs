use glam::{Vec2, Vec3};

use crate::fluid::splat::{correct_delta_x, correct_delta_y};

/// A mouse button or touch contact, in normalized canvas coordinates with y pointing up.
#[derive(Clone, Debug, PartialEq)]
pub struct Pointer {
    pub id: u64,
    pub texcoord: Vec2,
    pub prev_texcoord: Vec2,
    pub delta: Vec2,
    pub down: bool,
    pub moved: bool,
    pub color: Vec3,
}

impl Pointer {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            texcoord: Vec2::ZERO,
            prev_texcoord: Vec2::ZERO,
            delta: Vec2::ZERO,
            down: false,
            moved: false,
            color: Vec3::new(30.0, 0.0, 300.0),
        }
    }

    /// `position` is in physical pixels from the top-left of a `canvas` sized surface.
    pub fn press(&mut self, position: Vec2, canvas: Vec2, color: Vec3) {
        self.down = true;
        self.moved = false;
        self.texcoord = to_texcoord(position, canvas);
        self.prev_texcoord = self.texcoord;
        self.delta = Vec2::ZERO;
        self.color = color;
    }

    pub fn move_to(&mut self, position: Vec2, canvas: Vec2) {
        let aspect_ratio = canvas.x / canvas.y.max(1.0);
        self.prev_texcoord = self.texcoord;
        self.texcoord = to_texcoord(position, canvas);
        let delta = self.texcoord - self.prev_texcoord;
        self.delta = Vec2::new(correct_delta_x(delta.x, aspect_ratio), correct_delta_y(delta.y, aspect_ratio));
        self.moved = self.delta.x.abs() > 0.0 || self.delta.y.abs() > 0.0;
    }

    pub fn release(&mut self) {
        self.down = false;
        self.moved = false;
    }
}

fn to_texcoord(position: Vec2, canvas: Vec2) -> Vec2 {
    let canvas = canvas.max(Vec2::ONE);
    Vec2::new(position.x / canvas.x, 1.0 - position.y / canvas.y)
}

/// Folds `incoming` into `pointers` by id. Known pointers take the new position and
/// motion. They keep their current color, which color cycling may have changed, unless
/// the update is a fresh press. Unknown ones are appended.
pub fn merge_pointers(pointers: &mut Vec<Pointer>, incoming: impl IntoIterator<Item = Pointer>) {
    for pointer in incoming {
        match pointers.iter_mut().find(|existing| existing.id == pointer.id) {
            Some(existing) => {
                let pressed = pointer.down && !existing.down;
                let color = if pressed { pointer.color } else { existing.color };
                *existing = Pointer { color, ..pointer };
            }
            None => pointers.push(pointer),
        }
    }
}

/// Wraps `value` into `min..max`.
pub fn wrap(value: f32, min: f32, max: f32) -> f32 {
    let range = max - min;
    if range == 0.0 {
        return min;
    }
    (value - min).rem_euclid(range) + min
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Vec2 = Vec2::new(200.0, 100.0);

    #[test]
    fn press_flips_y_and_resets_motion() {
        let mut pointer = Pointer::new(1);
        pointer.press(Vec2::new(50.0, 25.0), CANVAS, Vec3::X);

        assert_eq!(pointer.texcoord, Vec2::new(0.25, 0.75));
        assert_eq!(pointer.prev_texcoord, pointer.texcoord);
        assert!(pointer.down);
        assert!(!pointer.moved);
    }

    #[test]
    fn move_corrects_vertical_delta_on_landscape() {
        let mut pointer = Pointer::new(1);
        pointer.press(Vec2::new(100.0, 50.0), CANVAS, Vec3::X);
        pointer.move_to(Vec2::new(120.0, 40.0), CANVAS);

        assert!(pointer.moved);
        assert!((pointer.delta.x - 0.1).abs() < 1e-6);
        assert!((pointer.delta.y - 0.05).abs() < 1e-6);
    }

    #[test]
    fn move_to_same_spot_is_not_a_move() {
        let mut pointer = Pointer::new(1);
        pointer.press(Vec2::new(10.0, 10.0), CANVAS, Vec3::X);
        pointer.move_to(Vec2::new(10.0, 10.0), CANVAS);
        assert!(!pointer.moved);
    }

    #[test]
    fn release_cancels_a_pending_move() {
        let mut pointer = Pointer::new(1);
        pointer.press(Vec2::new(100.0, 50.0), CANVAS, Vec3::X);
        pointer.move_to(Vec2::new(120.0, 50.0), CANVAS);

        pointer.release();

        assert!(!pointer.down);
        assert!(!pointer.moved);
    }

    #[test]
    fn release_after_a_consumed_move_adds_no_splat() {
        let mut mouse = Pointer::new(0);
        let mut pointers = Vec::new();
        mouse.press(Vec2::new(100.0, 50.0), CANVAS, Vec3::X);
        merge_pointers(&mut pointers, [mouse.clone()]);
        mouse.move_to(Vec2::new(120.0, 50.0), CANVAS);
        merge_pointers(&mut pointers, [mouse.clone()]);
        // A frame turns the move into a splat.
        pointers[0].moved = false;

        mouse.release();
        merge_pointers(&mut pointers, [mouse.clone()]);

        assert!(!pointers[0].moved);
        assert!(!pointers[0].down);
    }

    #[test]
    fn every_new_press_takes_its_own_color() {
        let mut mouse = Pointer::new(0);
        let mut pointers = Vec::new();
        mouse.press(Vec2::new(10.0, 10.0), CANVAS, Vec3::X);
        merge_pointers(&mut pointers, [mouse.clone()]);
        mouse.release();
        merge_pointers(&mut pointers, [mouse.clone()]);

        mouse.press(Vec2::new(20.0, 20.0), CANVAS, Vec3::Y);
        merge_pointers(&mut pointers, [mouse.clone()]);

        assert_eq!(pointers.len(), 1);
        assert_eq!(pointers[0].color, Vec3::Y);
    }

    #[test]
    fn merge_updates_known_ids_and_keeps_their_color() {
        let mut pointers = vec![Pointer { color: Vec3::Y, ..Pointer::new(1) }];
        let moved = Pointer { texcoord: Vec2::splat(0.5), moved: true, color: Vec3::Z, ..Pointer::new(1) };

        merge_pointers(&mut pointers, [moved, Pointer::new(2)]);

        assert_eq!(pointers.len(), 2);
        assert_eq!(pointers[0].texcoord, Vec2::splat(0.5));
        assert!(pointers[0].moved);
        assert_eq!(pointers[0].color, Vec3::Y);
        assert_eq!(pointers[1].id, 2);
    }

    #[test]
    fn wrap_stays_in_range() {
        assert!((wrap(1.25, 0.0, 1.0) - 0.25).abs() < 1e-6);
        assert!((wrap(-0.25, 0.0, 1.0) - 0.75).abs() < 1e-6);
        assert_eq!(wrap(3.0, 2.0, 2.0), 2.0);
    }
}
