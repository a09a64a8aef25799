// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transition configuration.
//!
//! A [`TransitionSettings`] is built once by the caller and shared by
//! reference (`Rc`) across the cell, the coordinator, and both drivers for
//! the whole modal session. The core never mutates it.

use alloc::boxed::Box;
use core::fmt;

use kurbo::{Insets, Point};

use crate::view::{ViewId, ViewStore};

/// Where the detail content anchors while expanding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CardVerticalExpandingStyle {
    /// The card's top edge stays pinned; content grows downward.
    #[default]
    FromTop,
    /// The card stays centered while growing in both directions.
    FromCenter,
}

/// Callback invoked with the detail content view at the moment expansion or
/// collapse begins, so the caller can animate auxiliary properties inside
/// the same block. The flag is `true` when presenting.
pub type CardViewAnimationHook = Box<dyn Fn(&mut ViewStore, ViewId, bool)>;

/// Read-only configuration knobs consumed by the transition core.
pub struct TransitionSettings {
    /// Scale applied to the cell while pressed.
    pub card_highlighted_factor: f64,
    /// Corner radius of the collapsed card.
    pub card_corner_radius: f64,
    /// Corner radius of the expanded detail view.
    pub details_corner_radius: f64,
    /// Total collapse duration, in seconds.
    pub dismissal_animation_duration: f64,
    /// Scroll offset the detail view is driven back to during dismissal.
    pub dismissal_scroll_view_content_offset: Point,
    /// Vertical anchoring of the expanding content.
    pub card_vertical_expanding_style: CardVerticalExpandingStyle,
    /// Host-side hint: compensate for list-header inset drift when the
    /// rendered card frame is measured. Never read by the core.
    pub is_enabled_weird_top_insets_fix: bool,
    /// Host-side hint: pin the detail screen's content below the top
    /// safe-area inset while presented. Never read by the core.
    pub is_enabled_top_safe_area_insets_fix_on_card_detail: bool,
    /// Whether a downward swipe at the detail's bottom edge may close it.
    /// Surfaced to hosts through the coordinator; the core animates the
    /// same way either way.
    pub is_enabled_bottom_close: bool,
    /// Whether touches are delivered while the highlight scale is applied.
    /// Surfaced to hosts through the cell.
    pub is_enabled_allows_user_interaction_while_highlighting_card: bool,
    /// Emit extra trace events for the transient animating views.
    pub is_enabled_debug_animating_views: bool,
    /// Opacity the dimming backdrop fades up to while presenting.
    pub backdrop_alpha: f64,
    /// Insets between the screen container and the floating container.
    pub card_container_insets: Insets,
    /// Optional auxiliary animation hook.
    pub additional_card_view_animations: Option<CardViewAnimationHook>,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            card_highlighted_factor: 0.96,
            card_corner_radius: 8.0,
            details_corner_radius: 16.0,
            dismissal_animation_duration: 0.6,
            dismissal_scroll_view_content_offset: Point::ZERO,
            card_vertical_expanding_style: CardVerticalExpandingStyle::default(),
            is_enabled_weird_top_insets_fix: false,
            is_enabled_top_safe_area_insets_fix_on_card_detail: true,
            is_enabled_bottom_close: false,
            is_enabled_allows_user_interaction_while_highlighting_card: true,
            is_enabled_debug_animating_views: false,
            backdrop_alpha: 1.0,
            card_container_insets: Insets::uniform(8.0),
            additional_card_view_animations: None,
        }
    }
}

impl fmt::Debug for TransitionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionSettings")
            .field("card_highlighted_factor", &self.card_highlighted_factor)
            .field("card_corner_radius", &self.card_corner_radius)
            .field("details_corner_radius", &self.details_corner_radius)
            .field(
                "dismissal_animation_duration",
                &self.dismissal_animation_duration,
            )
            .field(
                "dismissal_scroll_view_content_offset",
                &self.dismissal_scroll_view_content_offset,
            )
            .field(
                "card_vertical_expanding_style",
                &self.card_vertical_expanding_style,
            )
            .field(
                "is_enabled_weird_top_insets_fix",
                &self.is_enabled_weird_top_insets_fix,
            )
            .field(
                "is_enabled_top_safe_area_insets_fix_on_card_detail",
                &self.is_enabled_top_safe_area_insets_fix_on_card_detail,
            )
            .field("is_enabled_bottom_close", &self.is_enabled_bottom_close)
            .field(
                "is_enabled_allows_user_interaction_while_highlighting_card",
                &self.is_enabled_allows_user_interaction_while_highlighting_card,
            )
            .field(
                "is_enabled_debug_animating_views",
                &self.is_enabled_debug_animating_views,
            )
            .field("backdrop_alpha", &self.backdrop_alpha)
            .field("card_container_insets", &self.card_container_insets)
            .field(
                "additional_card_view_animations",
                &self.additional_card_view_animations.is_some(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let s = TransitionSettings::default();
        assert_eq!(s.card_highlighted_factor, 0.96);
        assert_eq!(s.card_corner_radius, 8.0);
        assert_eq!(s.details_corner_radius, 16.0);
        assert_eq!(s.dismissal_animation_duration, 0.6);
        assert_eq!(s.dismissal_scroll_view_content_offset, Point::ZERO);
        assert_eq!(
            s.card_vertical_expanding_style,
            CardVerticalExpandingStyle::FromTop
        );
        assert!(!s.is_enabled_weird_top_insets_fix);
        assert!(s.is_enabled_top_safe_area_insets_fix_on_card_detail);
        assert!(!s.is_enabled_bottom_close);
        assert!(s.is_enabled_allows_user_interaction_while_highlighting_card);
        assert!(!s.is_enabled_debug_animating_views);
        assert_eq!(s.backdrop_alpha, 1.0);
        assert_eq!(s.card_container_insets, Insets::uniform(8.0));
        assert!(s.additional_card_view_animations.is_none());
    }
}
