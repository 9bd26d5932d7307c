pub const DETECTOR_MODEL_NAME: &str = "opencv_face_detector.onnx";
pub const AGE_MODEL_NAME: &str = "age_net.onnx";
pub const GENDER_MODEL_NAME: &str = "gender_net.onnx";

/// Subdirectory under the platform data dir that holds bundled models.
pub const APP_DIR_NAME: &str = "FaceLens";

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Context margin, in pixels, added around each face before classification.
pub const DEFAULT_PADDING: u32 = 20;

pub const DETECTOR_INPUT_SIZE: u32 = 300;
/// Per-channel mean in RGB order.
pub const DETECTOR_MEAN: [f32; 3] = [104.0, 117.0, 123.0];

pub const CLASSIFIER_INPUT_SIZE: u32 = 227;
/// Per-channel mean in BGR order, as the age/gender nets were trained.
pub const CLASSIFIER_MEAN: [f32; 3] = [78.426_34, 87.768_91, 114.895_85];

/// Box thickness is `frame_height / BOX_THICKNESS_DIVISOR`, rounded.
pub const BOX_THICKNESS_DIVISOR: f64 = 150.0;

/// Vertical offset of the label baseline above a face box.
pub const LABEL_OFFSET_Y: i32 = 10;

pub const BOX_COLOR: [u8; 3] = [0, 255, 0];
pub const LABEL_COLOR: [u8; 3] = [255, 255, 0];

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
