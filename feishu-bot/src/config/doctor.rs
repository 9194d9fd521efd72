//! Startup self-check of the Feishu and OpenAI credentials.

use serde::Serialize;

use super::BotConfig;

/// A user-facing message in both supported languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizedMessage {
    #[serde(rename = "zh_CN")]
    pub zh_cn: String,
    #[serde(rename = "en_US")]
    pub en_us: String,
}

impl LocalizedMessage {
    pub fn new(zh_cn: &str, en_us: &str) -> Self {
        Self {
            zh_cn: zh_cn.to_string(),
            en_us: en_us.to_string(),
        }
    }
}

/// Config summary included in a passing report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DoctorMeta {
    pub feishu_app_id: String,
    pub openai_model: String,
    pub openai_max_token: u32,
    pub feishu_botname: String,
}

/// Result of [`BotConfig::doctor`]. `code` is 0 when the config is usable, 1 otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorReport {
    pub code: i32,
    pub message: LocalizedMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<DoctorMeta>,
}

impl DoctorReport {
    fn failure(zh_cn: &str, en_us: &str) -> Self {
        Self {
            code: 1,
            message: LocalizedMessage::new(zh_cn, en_us),
            meta: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

impl BotConfig {
    /// Validates credentials in order and reports the first problem found.
    pub fn doctor(&self) -> DoctorReport {
        if self.feishu_app_id.is_empty() {
            return DoctorReport::failure(
                "你没有配置飞书应用的 AppID，请检查 & 部署后重试",
                "Here is no FeiShu APP id, please check & re-Deploy & call again",
            );
        }
        if !self.feishu_app_id.starts_with("cli_") {
            return DoctorReport::failure(
                "你配置的飞书应用的 AppID 是错误的，请检查后重试。飞书应用的 APPID 以 cli_ 开头。",
                "Your FeiShu App ID is Wrong, Please Check and call again. FeiShu APPID must Start with cli",
            );
        }
        if self.feishu_app_secret.is_empty() {
            return DoctorReport::failure(
                "你没有配置飞书应用的 Secret，请检查 & 部署后重试",
                "Here is no FeiShu APP Secret, please check & re-Deploy & call again",
            );
        }
        if self.feishu_bot_name.is_empty() {
            return DoctorReport::failure(
                "你没有配置飞书应用的名称，请检查 & 部署后重试",
                "Here is no FeiShu APP Name, please check & re-Deploy & call again",
            );
        }
        if self.openai_api_key.is_empty() {
            return DoctorReport::failure(
                "你没有配置 OpenAI 的 Key，请检查 & 部署后重试",
                "Here is no OpenAI Key, please check & re-Deploy & call again",
            );
        }
        if !self.openai_api_key.starts_with("sk-") {
            return DoctorReport::failure(
                "你配置的 OpenAI Key 是错误的，请检查后重试。OpenAI 的 KEY 以 sk- 开头。",
                "Your OpenAI Key is Wrong, Please Check and call again. OpenAI Key must Start with sk-",
            );
        }

        DoctorReport {
            code: 0,
            message: LocalizedMessage::new(
                "✅ 配置成功，接下来你可以在飞书应用当中使用机器人来完成你的工作。",
                "✅ Configuration is correct, you can use this bot in your FeiShu App",
            ),
            meta: Some(DoctorMeta {
                feishu_app_id: self.feishu_app_id.clone(),
                openai_model: self.openai_model.clone(),
                openai_max_token: self.openai_max_token,
                feishu_botname: self.feishu_bot_name.clone(),
            }),
        }
    }
}
