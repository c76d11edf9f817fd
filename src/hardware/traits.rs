/// One of the four user LEDs
pub trait Led {
    fn set(&mut self, on: bool);
    fn is_on(&self) -> bool;

    fn on(&mut self) {
        self.set(true);
    }

    fn off(&mut self) {
        self.set(false);
    }

    fn toggle(&mut self) {
        let on = self.is_on();
        self.set(!on);
    }
}

pub trait Button {
    fn is_pressed(&self) -> bool;
}
