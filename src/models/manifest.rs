// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Farcaster mini-app manifest served at `/.well-known/farcaster.json`.

use crate::config::Config;
use serde::Serialize;

const APP_NAME: &str = "Vibe Check";
const LOGO_PATH: &str = "/vibe_check_logo.jpg";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniAppManifest {
    pub account_association: AccountAssociationBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_builder: Option<BaseBuilderBlock>,
    pub miniapp: MiniAppBlock,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountAssociationBlock {
    pub header: String,
    pub payload: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseBuilderBlock {
    pub owner_address: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniAppBlock {
    pub version: String,
    pub name: String,
    pub subtitle: String,
    pub description: String,
    pub screenshot_urls: Vec<String>,
    pub icon_url: String,
    pub splash_image_url: String,
    pub splash_background_color: String,
    pub home_url: String,
    pub primary_category: String,
    pub tags: Vec<String>,
    pub hero_image_url: String,
    pub tagline: String,
    pub og_title: String,
    pub og_description: String,
    pub og_image_url: String,
}

impl MiniAppManifest {
    /// Build the manifest for the configured deployment.
    pub fn from_config(config: &Config) -> Self {
        let root = config.public_url.trim_end_matches('/');
        let logo = format!("{}{}", root, LOGO_PATH);

        Self {
            account_association: AccountAssociationBlock {
                header: config.account_association.header.clone(),
                payload: config.account_association.payload.clone(),
                signature: config.account_association.signature.clone(),
            },
            base_builder: config
                .base_builder_owner
                .clone()
                .map(|owner_address| BaseBuilderBlock { owner_address }),
            miniapp: MiniAppBlock {
                version: "1".to_string(),
                name: APP_NAME.to_string(),
                subtitle: "Check Your Signal Score".to_string(),
                description: "Track your Farcaster signal strength, growth stats, and daily \
                              vibe. Get insights into your followers, score tier, and streak."
                    .to_string(),
                screenshot_urls: vec![format!("{}/screenshot-portrait.png", root)],
                icon_url: logo.clone(),
                splash_image_url: logo.clone(),
                splash_background_color: "#000000".to_string(),
                home_url: root.to_string(),
                primary_category: "social".to_string(),
                tags: ["social", "analytics", "farcaster", "signal", "stats"]
                    .iter()
                    .map(|t| t.to_string())
                    .collect(),
                hero_image_url: logo.clone(),
                tagline: "Sync up and check your vibe".to_string(),
                og_title: format!("{} - Check Your Vibe Score", APP_NAME),
                og_description: "Track your Farcaster vibe score and see where you rank."
                    .to_string(),
                og_image_url: logo,
            },
        }
    }
}
