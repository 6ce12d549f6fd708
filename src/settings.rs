use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{App, Arg};
use config::Config;
use serde::Deserialize;
use serde_with::{serde_as, DurationSecondsWithFrac};
use url::Url;

use crate::log::LogSettings;

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bind_address: IpAddr,
    pub port: u16,
    /// default target of the "view full details" link; when unset the
    /// `externalURL` field of each batch is used instead
    pub external_url: Option<String>,
    /// timeout for a single outbound push so a hung provider can't block a
    /// handler indefinitely
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub request_timeout: Duration,
    /// DingTalk robot send endpoint
    pub dingtalk_api: Url,
    /// WeChat Work robot send endpoint
    pub wechat_api: Url,
    pub log: LogSettings,
}

impl Settings {
    pub fn to_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// Load settings from the optional config file merged with environment
    /// variables (`EXTERNAL_URL`, `LOG_LEVEL`, ...). Command line arguments
    /// win over both.
    pub fn load() -> Result<Self> {
        let opts = App::new(clap::crate_name!())
            .version(clap::crate_version!())
            .about(clap::crate_description!())
            .args(&[
                Arg::new("config")
                    .help("path of config file")
                    .takes_value(true)
                    .short('c')
                    .long("config")
                    .default_value("./config.yaml"),
                Arg::new("level")
                    .help("log level")
                    .possible_values(["Error", "Warn", "Info", "Debug", "Trace"])
                    .ignore_case(true)
                    .takes_value(true)
                    .long("log"),
            ])
            .get_matches();

        #[allow(clippy::expect_used)]
        let config_path = opts.value_of("config").expect("config has a default value");

        let conf = Config::builder()
            .set_default("bind_address", "0.0.0.0")?
            .set_default("port", 5000_i64)?
            .set_default("request_timeout", 10.0_f64)?
            .set_default("log.level", "Info")?
            .set_default("dingtalk_api", "https://oapi.dingtalk.com/robot/send")?
            .set_default("wechat_api", "https://qyapi.weixin.qq.com/cgi-bin/webhook/send")?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::default())
            .build()
            .context("can't load config")?;

        let mut settings: Settings = conf.try_deserialize().context("can't load config")?;

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            settings.log.level = level;
        }
        if let Some(level) = opts.value_of("level") {
            settings.log.level = level.to_string();
        }

        Ok(settings)
    }
}
