pub mod config {
    pub mod action_table;
    pub mod guard_config;
}

pub mod detection {
    pub mod domain {
        pub mod face_counter;
        pub mod heatmap;
        pub mod heatmap_detector;
        pub mod region_extractor;
    }
    pub mod infrastructure;
}

pub mod monitor {
    pub mod guard_session;
    pub mod session_stats;
    pub mod infrastructure {
        pub mod session_factory;
        pub mod threaded_monitor;
    }
}

pub mod occupancy {
    pub mod domain {
        pub mod occupancy_state;
        pub mod occupancy_state_machine;
    }
}

pub mod presentation {
    pub mod domain {
        pub mod notifier;
        pub mod preview_surface;
    }
    pub mod infrastructure {
        pub mod snapshot_preview;
        pub mod system_notifier;
    }
}

pub mod protection {
    pub mod domain {
        pub mod launch_command;
        pub mod process_launcher;
        pub mod protective_action;
    }
    pub mod infrastructure;
}

pub mod shared {
    pub mod capture_metadata;
    pub mod constants;
    pub mod detection;
    pub mod frame;
    pub mod platform;
}

pub mod video {
    pub mod domain {
        pub mod frame_source;
    }
    pub mod infrastructure {
        pub mod ffmpeg_camera_source;
    }
}
