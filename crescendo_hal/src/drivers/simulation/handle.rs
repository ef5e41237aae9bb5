//! Shared handle to a simulated component.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crescendo_common::geometry::{ChassisSpeeds, Pose2d};
use crescendo_common::hal::driver::{Drivebase, InputSource, MechanismIo};
use crescendo_common::hal::types::DriveRequest;
use crescendo_common::robot::input::OperatorInputs;

/// Reference-counted handle to a simulation model.
///
/// The control unit owns one clone as its IO handle; a test or the
/// simulation binary keeps another to poke sensors. Single-threaded only.
#[derive(Debug, Default)]
pub struct SimHandle<T>(Rc<RefCell<T>>);

impl<T> SimHandle<T> {
    /// Wrap a model.
    pub fn new(model: T) -> Self {
        Self(Rc::new(RefCell::new(model)))
    }

    /// Borrow the model.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    /// Mutably borrow the model.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }
}

impl<T> Clone for SimHandle<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: MechanismIo> MechanismIo for SimHandle<T> {
    type Feedback = T::Feedback;
    type Command = T::Command;

    fn read(&mut self) -> Option<Self::Feedback> {
        self.0.borrow_mut().read()
    }

    fn write(&mut self, command: &Self::Command) {
        self.0.borrow_mut().write(command);
    }
}

impl<T: Drivebase> Drivebase for SimHandle<T> {
    fn apply(&mut self, request: &DriveRequest) {
        self.0.borrow_mut().apply(request);
    }

    fn reset_odometry(&mut self) {
        self.0.borrow_mut().reset_odometry();
    }

    fn pose(&self) -> Pose2d {
        self.0.borrow().pose()
    }

    fn chassis_speeds(&self) -> ChassisSpeeds {
        self.0.borrow().chassis_speeds()
    }

    fn battery_voltage(&self) -> Option<f64> {
        self.0.borrow().battery_voltage()
    }
}

impl<T: InputSource> InputSource for SimHandle<T> {
    fn poll(&mut self) -> OperatorInputs {
        self.0.borrow_mut().poll()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        writes: u32,
    }

    impl MechanismIo for Counter {
        type Feedback = u32;
        type Command = u32;

        fn read(&mut self) -> Option<u32> {
            Some(self.writes)
        }

        fn write(&mut self, command: &u32) {
            self.writes += command;
        }
    }

    #[test]
    fn clones_share_the_model() {
        let a = SimHandle::new(Counter { writes: 0 });
        let mut b = a.clone();
        b.write(&3);
        assert_eq!(a.borrow().writes, 3);
        assert_eq!(b.read(), Some(3));
    }
}
