pub mod shared {
    pub mod core {
        pub mod session_id;
    }
    pub mod infrastructure {
        pub mod config;
    }
}

pub mod modules {
    pub mod background {
        pub mod core {
            pub mod codec;
            pub mod commands;
            pub mod events;
            pub mod ports;
        }
        pub mod use_cases {
            pub mod bridge_message {
                pub mod envelope;
                pub mod handler;
            }
            pub mod start_background {
                pub mod push_activation;
                pub mod runner;
                pub mod status;
            }
        }
        pub mod adapters {
            pub mod inbound {
                pub mod message_channel;
            }
            pub mod outbound {
                pub mod data_migration_in_memory;
                pub mod product_catalogue_in_memory;
                pub mod product_updater_alarm_interval;
                pub mod push_notifications_in_memory;
                pub mod service_worker_in_memory;
            }
        }
    }
}

pub mod shell;

#[cfg(test)]
pub mod tests {
    pub mod fixtures;
}
