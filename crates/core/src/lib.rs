pub mod shared {
    pub mod blob;
    pub mod config;
    pub mod constants;
    pub mod frame;
    pub mod model_resolver;
    pub mod rect;
    pub mod video_metadata;
}

pub mod inference {
    pub mod domain {
        pub mod inference_model;
    }
    pub mod infrastructure;
}

pub mod detection {
    pub mod domain {
        pub mod detection;
        pub mod face_detector;
        pub mod face_localizer;
    }
}

pub mod classification {
    pub mod domain {
        pub mod attribute_classifier;
        pub mod labels;
    }
}

pub mod rendering {
    pub mod glyphs;
    pub mod overlay;
}

pub mod video {
    pub mod domain {
        pub mod frame_sink;
        pub mod video_reader;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod frame_report;
    pub mod pipeline_logger;
    pub mod process_frame_use_case;
    pub mod run_session_use_case;
    pub mod session_state;
    pub mod stop_signal;
}
