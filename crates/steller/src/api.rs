/// Host services a layout stage may query. Only the viewport size is needed here.
pub trait ExtensionApi {
    fn get_width(&self) -> f64;
    fn get_height(&self) -> f64;
}

/// A fixed-size viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl ExtensionApi for Viewport {
    fn get_width(&self) -> f64 {
        self.width
    }

    fn get_height(&self) -> f64 {
        self.height
    }
}
