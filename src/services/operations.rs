use image::{DynamicImage, ImageFormat, Luma};
use std::collections::BTreeMap;

use crate::services::filters::{self, Kernel};

/// Side of the averaging window used by `cblur`
pub const BLUR_WINDOW: u32 = 10;

/// Side of the normalized kernel used by `csmoothing`
pub const SMOOTHING_KERNEL: u32 = 5;

/// Gray level at which `cthreshold` switches to white
pub const THRESHOLD_LEVEL: u8 = 120;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Invalid operation")]
    EmptyOperation,

    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("Error reading the image file: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image of {width}x{height} is too small to resize")]
    TooSmall { width: u32, height: u32 },

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    Encode(String),
}

/// Uniform signature shared by every transformation
pub type Transform = fn(&DynamicImage) -> Result<DynamicImage, ProcessError>;

/// One registered transformation and how its output is named
#[derive(Clone, Copy)]
pub struct Operation {
    pub id: &'static str,
    pub label: &'static str,
    /// Appended to the base name, before the extension
    pub suffix: &'static str,
    pub format: ImageFormat,
    pub transform: Transform,
}

impl Operation {
    /// Output file name for an input whose base name is `base`
    pub fn output_name(&self, base: &str) -> String {
        let ext = self.format.extensions_str().first().copied().unwrap_or("bin");
        format!("{}{}.{}", base, self.suffix, ext)
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("id", &self.id)
            .field("suffix", &self.suffix)
            .field("format", &self.format)
            .finish()
    }
}

/// Maps operation identifiers to transformations
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    operations: BTreeMap<&'static str, Operation>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in operation
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for op in [
            Operation {
                id: "cgray",
                label: "Convert to grayscale",
                suffix: "_gray",
                format: ImageFormat::Jpeg,
                transform: grayscale,
            },
            Operation {
                id: "cwebp",
                label: "Convert to WebP",
                suffix: "",
                format: ImageFormat::WebP,
                transform: unchanged,
            },
            Operation {
                id: "cjpg",
                label: "Convert to JPG",
                suffix: "",
                format: ImageFormat::Jpeg,
                transform: unchanged,
            },
            Operation {
                id: "cpng",
                label: "Convert to PNG",
                suffix: "",
                format: ImageFormat::Png,
                transform: unchanged,
            },
            Operation {
                id: "cblur",
                label: "Blur",
                suffix: "_blur",
                format: ImageFormat::Jpeg,
                transform: blur,
            },
            Operation {
                id: "cthreshold",
                label: "Threshold",
                suffix: "_threshold",
                format: ImageFormat::Jpeg,
                transform: threshold,
            },
            Operation {
                id: "cresize",
                label: "Resize to half",
                suffix: "_resized",
                format: ImageFormat::Jpeg,
                transform: half_size,
            },
            Operation {
                id: "csmoothing",
                label: "Smoothing",
                suffix: "_smoothing",
                format: ImageFormat::Jpeg,
                transform: smoothing,
            },
        ] {
            registry.register(op);
        }
        registry
    }

    /// Adds or replaces an operation
    pub fn register(&mut self, operation: Operation) {
        self.operations.insert(operation.id, operation);
    }

    /// Looks up an operation, distinguishing empty from unknown identifiers
    pub fn resolve(&self, id: &str) -> Result<&Operation, ProcessError> {
        if id.is_empty() {
            return Err(ProcessError::EmptyOperation);
        }
        self.operations
            .get(id)
            .ok_or_else(|| ProcessError::UnknownOperation(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.operations.contains_key(id)
    }

    /// Operations in identifier order
    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }
}

fn unchanged(img: &DynamicImage) -> Result<DynamicImage, ProcessError> {
    Ok(img.clone())
}

fn grayscale(img: &DynamicImage) -> Result<DynamicImage, ProcessError> {
    Ok(DynamicImage::ImageLuma8(filters::luma_bt601(&img.to_rgb8())))
}

fn blur(img: &DynamicImage) -> Result<DynamicImage, ProcessError> {
    let rgb = img.to_rgb8();
    Ok(DynamicImage::ImageRgb8(filters::box_blur(
        &rgb,
        BLUR_WINDOW,
        BLUR_WINDOW,
    )))
}

fn threshold(img: &DynamicImage) -> Result<DynamicImage, ProcessError> {
    let mut gray = filters::luma_bt601(&img.to_rgb8());
    for Luma([level]) in gray.pixels_mut() {
        *level = if *level >= THRESHOLD_LEVEL { 255 } else { 0 };
    }
    Ok(DynamicImage::ImageLuma8(gray))
}

fn half_size(img: &DynamicImage) -> Result<DynamicImage, ProcessError> {
    let (width, height) = (img.width() / 2, img.height() / 2);
    if width == 0 || height == 0 {
        return Err(ProcessError::TooSmall {
            width: img.width(),
            height: img.height(),
        });
    }
    Ok(DynamicImage::ImageRgb8(filters::resize_linear(
        &img.to_rgb8(),
        width,
        height,
    )))
}

fn smoothing(img: &DynamicImage) -> Result<DynamicImage, ProcessError> {
    let rgb = img.to_rgb8();
    let kernel = Kernel::normalized_box(SMOOTHING_KERNEL, SMOOTHING_KERNEL);
    Ok(DynamicImage::ImageRgb8(filters::convolve(&rgb, &kernel)))
}
