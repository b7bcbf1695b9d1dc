//! facade::kind
//!
//! The closed set of facade categories and their behavior tables.
//!
//! # Architecture
//!
//! Every facade has exactly one [`FacadeKind`], derived from the category of
//! the compiler-model node it wraps by [`classify`]. Property kinds carry a
//! [`PropertyBehavior`] row (naming rule, icon, assignable provider classes)
//! instead of behavior spread over a type hierarchy, so adding a kind means
//! adding one table row and fixing every exhaustive `match` the compiler
//! points at.

use serde::{Deserialize, Serialize};

use crate::core::naming::NamingRule;
use crate::model::{ContextualRole, FacetRole, NodeKind};

/// Library-member categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    BusinessObject,
    CoreObject,
    ChoiceObject,
    ValueWithAttributes,
    ClosedEnumeration,
    OpenEnumeration,
    SimpleType,
    XsdSimple,
    ContextualFacet(ContextualRole),
    Resource,
}

/// Property categories: attribute, element and indicator in their plain,
/// reference and id variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Attribute,
    IdAttribute,
    AttributeRef,
    Element,
    ElementRef,
    Indicator,
    IndicatorElement,
}

/// Facade categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacadeKind {
    Member(MemberKind),
    Facet(FacetRole),
    Property(PropertyKind),
    Alias,
    ValueLiteral,
    ResourceAction,
    ActionRequest,
    ActionResponse,
    ParamGroup,
    Parameter,
}

/// Provider categories used by type-compatibility rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderClass {
    Simple,
    Enumeration,
    ValueWithAttributes,
    CoreObject,
    BusinessObject,
    ChoiceObject,
    Facet,
    ContextualFacet,
}

impl ProviderClass {
    /// Providers whose name propagates to element users.
    pub fn controls_name(self) -> bool {
        matches!(
            self,
            ProviderClass::CoreObject
                | ProviderClass::BusinessObject
                | ProviderClass::ChoiceObject
                | ProviderClass::Facet
                | ProviderClass::ContextualFacet
        )
    }
}

/// Per-kind behavior of a property facade.
#[derive(Debug, Clone, Copy)]
pub struct PropertyBehavior {
    pub kind: PropertyKind,
    pub label: &'static str,
    pub icon: &'static str,
    pub naming: NamingRule,
    /// Name given to a freshly added property of this kind.
    pub default_name: &'static str,
    /// Provider classes this kind may be assigned.
    pub providers: &'static [ProviderClass],
    /// Whether adding one changes required structure (never optional).
    pub required: bool,
}

const SIMPLE_PROVIDERS: &[ProviderClass] = &[
    ProviderClass::Simple,
    ProviderClass::Enumeration,
    ProviderClass::ValueWithAttributes,
];

const ELEMENT_PROVIDERS: &[ProviderClass] = &[
    ProviderClass::Simple,
    ProviderClass::Enumeration,
    ProviderClass::ValueWithAttributes,
    ProviderClass::CoreObject,
    ProviderClass::BusinessObject,
    ProviderClass::ChoiceObject,
    ProviderClass::Facet,
    ProviderClass::ContextualFacet,
];

const OBJECT_PROVIDERS: &[ProviderClass] = &[
    ProviderClass::CoreObject,
    ProviderClass::BusinessObject,
    ProviderClass::ChoiceObject,
];

const PROPERTY_BEHAVIORS: [PropertyBehavior; 7] = [
    PropertyBehavior {
        kind: PropertyKind::Attribute,
        label: "Attribute",
        icon: "attribute",
        naming: NamingRule::LowerFirst,
        default_name: "newAttribute",
        providers: SIMPLE_PROVIDERS,
        required: false,
    },
    PropertyBehavior {
        kind: PropertyKind::IdAttribute,
        label: "ID Attribute",
        icon: "id-attribute",
        naming: NamingRule::LowerFirst,
        default_name: "id",
        providers: &[ProviderClass::Simple],
        required: true,
    },
    PropertyBehavior {
        kind: PropertyKind::AttributeRef,
        label: "Attribute Reference",
        icon: "attribute-ref",
        naming: NamingRule::FromType,
        default_name: "newRef",
        providers: &[ProviderClass::CoreObject, ProviderClass::BusinessObject],
        required: false,
    },
    PropertyBehavior {
        kind: PropertyKind::Element,
        label: "Element",
        icon: "element",
        naming: NamingRule::UpperFirst,
        default_name: "NewElement",
        providers: ELEMENT_PROVIDERS,
        required: false,
    },
    PropertyBehavior {
        kind: PropertyKind::ElementRef,
        label: "Element Reference",
        icon: "element-ref",
        naming: NamingRule::FromType,
        default_name: "NewRef",
        providers: OBJECT_PROVIDERS,
        required: false,
    },
    PropertyBehavior {
        kind: PropertyKind::Indicator,
        label: "Indicator",
        icon: "indicator",
        naming: NamingRule::Indicator,
        default_name: "newInd",
        providers: &[],
        required: false,
    },
    PropertyBehavior {
        kind: PropertyKind::IndicatorElement,
        label: "Indicator Element",
        icon: "indicator-element",
        naming: NamingRule::Indicator,
        default_name: "newElementInd",
        providers: &[],
        required: false,
    },
];

impl PropertyKind {
    pub const ALL: [PropertyKind; 7] = [
        PropertyKind::Attribute,
        PropertyKind::IdAttribute,
        PropertyKind::AttributeRef,
        PropertyKind::Element,
        PropertyKind::ElementRef,
        PropertyKind::Indicator,
        PropertyKind::IndicatorElement,
    ];

    /// The behavior row for this kind.
    pub fn behavior(self) -> &'static PropertyBehavior {
        &PROPERTY_BEHAVIORS[self as usize]
    }

    /// Compiler-model category for new nodes of this kind.
    pub fn node_kind(self) -> NodeKind {
        match self {
            PropertyKind::Attribute => NodeKind::Attribute,
            PropertyKind::IdAttribute => NodeKind::IdAttribute,
            PropertyKind::AttributeRef => NodeKind::AttributeRef,
            PropertyKind::Element => NodeKind::Element,
            PropertyKind::ElementRef => NodeKind::ElementRef,
            PropertyKind::Indicator => NodeKind::Indicator,
            PropertyKind::IndicatorElement => NodeKind::IndicatorElement,
        }
    }

    /// Attribute-like kinds live in the XML attribute space.
    pub fn is_attribute(self) -> bool {
        matches!(
            self,
            PropertyKind::Attribute | PropertyKind::IdAttribute | PropertyKind::AttributeRef
        )
    }
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.behavior().label)
    }
}

impl MemberKind {
    /// Provider class when this member is used as a type.
    pub fn provider_class(self) -> Option<ProviderClass> {
        match self {
            MemberKind::SimpleType | MemberKind::XsdSimple => Some(ProviderClass::Simple),
            MemberKind::ClosedEnumeration | MemberKind::OpenEnumeration => {
                Some(ProviderClass::Enumeration)
            }
            MemberKind::ValueWithAttributes => Some(ProviderClass::ValueWithAttributes),
            MemberKind::CoreObject => Some(ProviderClass::CoreObject),
            MemberKind::BusinessObject => Some(ProviderClass::BusinessObject),
            MemberKind::ChoiceObject => Some(ProviderClass::ChoiceObject),
            MemberKind::ContextualFacet(_) => Some(ProviderClass::ContextualFacet),
            MemberKind::Resource => None,
        }
    }

    /// Whether this member may extend another member of the same kind.
    pub fn supports_base_type(self) -> bool {
        matches!(
            self,
            MemberKind::BusinessObject
                | MemberKind::CoreObject
                | MemberKind::ChoiceObject
                | MemberKind::ClosedEnumeration
                | MemberKind::OpenEnumeration
        )
    }

    /// Whether this member may carry aliases.
    pub fn supports_aliases(self) -> bool {
        matches!(
            self,
            MemberKind::BusinessObject | MemberKind::CoreObject | MemberKind::ChoiceObject
        )
    }

    pub fn is_enumeration(self) -> bool {
        matches!(
            self,
            MemberKind::ClosedEnumeration | MemberKind::OpenEnumeration
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            MemberKind::BusinessObject => "Business Object",
            MemberKind::CoreObject => "Core Object",
            MemberKind::ChoiceObject => "Choice Object",
            MemberKind::ValueWithAttributes => "Value With Attributes",
            MemberKind::ClosedEnumeration => "Closed Enumeration",
            MemberKind::OpenEnumeration => "Open Enumeration",
            MemberKind::SimpleType => "Simple Type",
            MemberKind::XsdSimple => "XSD Simple Type",
            MemberKind::ContextualFacet(ContextualRole::Custom) => "Custom Facet",
            MemberKind::ContextualFacet(ContextualRole::Query) => "Query Facet",
            MemberKind::ContextualFacet(ContextualRole::Update) => "Update Facet",
            MemberKind::ContextualFacet(ContextualRole::Choice) => "Choice Facet",
            MemberKind::Resource => "Resource",
        }
    }
}

impl FacadeKind {
    /// Provider class when a facade of this kind is used as a type.
    pub fn provider_class(self) -> Option<ProviderClass> {
        match self {
            FacadeKind::Member(member) => member.provider_class(),
            FacadeKind::Facet(_) => Some(ProviderClass::Facet),
            _ => None,
        }
    }

    /// Provider classes a user of this kind may be assigned, or `None` if
    /// this kind is not a type user.
    pub fn assignable(self) -> Option<&'static [ProviderClass]> {
        match self {
            FacadeKind::Property(kind) => Some(kind.behavior().providers),
            FacadeKind::Member(MemberKind::SimpleType) => Some(&[ProviderClass::Simple]),
            FacadeKind::Member(MemberKind::ValueWithAttributes) => Some(SIMPLE_PROVIDERS),
            FacadeKind::Member(MemberKind::Resource) => Some(&[ProviderClass::BusinessObject]),
            FacadeKind::ActionRequest | FacadeKind::ActionResponse => Some(&[
                ProviderClass::CoreObject,
                ProviderClass::BusinessObject,
                ProviderClass::ChoiceObject,
                ProviderClass::Facet,
                ProviderClass::ContextualFacet,
            ]),
            _ => None,
        }
    }

    /// Naming rule for caller-supplied names; `None` if names are derived.
    pub fn naming(self) -> Option<NamingRule> {
        match self {
            FacadeKind::Member(_) => Some(NamingRule::UpperFirst),
            FacadeKind::Property(kind) => Some(kind.behavior().naming),
            FacadeKind::Alias => Some(NamingRule::UpperFirst),
            FacadeKind::ValueLiteral | FacadeKind::ResourceAction | FacadeKind::Parameter => {
                Some(NamingRule::Verbatim)
            }
            FacadeKind::ParamGroup => Some(NamingRule::UpperFirst),
            FacadeKind::Facet(_) | FacadeKind::ActionRequest | FacadeKind::ActionResponse => None,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            FacadeKind::Member(MemberKind::ContextualFacet(_)) => "contextual-facet",
            FacadeKind::Member(_) => "member",
            FacadeKind::Facet(_) => "facet",
            FacadeKind::Property(kind) => kind.behavior().icon,
            FacadeKind::Alias => "alias",
            FacadeKind::ValueLiteral => "value",
            FacadeKind::ResourceAction => "action",
            FacadeKind::ActionRequest => "request",
            FacadeKind::ActionResponse => "response",
            FacadeKind::ParamGroup => "param-group",
            FacadeKind::Parameter => "parameter",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FacadeKind::Member(member) => member.label(),
            FacadeKind::Facet(_) => "Facet",
            FacadeKind::Property(kind) => kind.behavior().label,
            FacadeKind::Alias => "Alias",
            FacadeKind::ValueLiteral => "Value",
            FacadeKind::ResourceAction => "Action",
            FacadeKind::ActionRequest => "Request",
            FacadeKind::ActionResponse => "Response",
            FacadeKind::ParamGroup => "Parameter Group",
            FacadeKind::Parameter => "Parameter",
        }
    }

    pub fn is_member(self) -> bool {
        matches!(self, FacadeKind::Member(_))
    }

    pub fn as_property(self) -> Option<PropertyKind> {
        match self {
            FacadeKind::Property(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn as_member(self) -> Option<MemberKind> {
        match self {
            FacadeKind::Member(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Map a compiler-model category to its facade category.
///
/// Returns `None` for categories that have no facade (extension-point
/// facets); callers log and skip those nodes.
pub fn classify(kind: NodeKind) -> Option<FacadeKind> {
    let facade = match kind {
        NodeKind::BusinessObject => FacadeKind::Member(MemberKind::BusinessObject),
        NodeKind::CoreObject => FacadeKind::Member(MemberKind::CoreObject),
        NodeKind::ChoiceObject => FacadeKind::Member(MemberKind::ChoiceObject),
        NodeKind::ValueWithAttributes => FacadeKind::Member(MemberKind::ValueWithAttributes),
        NodeKind::ClosedEnumeration => FacadeKind::Member(MemberKind::ClosedEnumeration),
        NodeKind::OpenEnumeration => FacadeKind::Member(MemberKind::OpenEnumeration),
        NodeKind::SimpleType => FacadeKind::Member(MemberKind::SimpleType),
        NodeKind::XsdSimple => FacadeKind::Member(MemberKind::XsdSimple),
        NodeKind::ContextualFacet(role) => FacadeKind::Member(MemberKind::ContextualFacet(role)),
        NodeKind::Resource => FacadeKind::Member(MemberKind::Resource),
        NodeKind::Facet(role) => FacadeKind::Facet(role),
        NodeKind::ExtensionPointFacet => return None,
        NodeKind::Attribute => FacadeKind::Property(PropertyKind::Attribute),
        NodeKind::IdAttribute => FacadeKind::Property(PropertyKind::IdAttribute),
        NodeKind::AttributeRef => FacadeKind::Property(PropertyKind::AttributeRef),
        NodeKind::Element => FacadeKind::Property(PropertyKind::Element),
        NodeKind::ElementRef => FacadeKind::Property(PropertyKind::ElementRef),
        NodeKind::Indicator => FacadeKind::Property(PropertyKind::Indicator),
        NodeKind::IndicatorElement => FacadeKind::Property(PropertyKind::IndicatorElement),
        NodeKind::Alias => FacadeKind::Alias,
        NodeKind::EnumValue => FacadeKind::ValueLiteral,
        NodeKind::ResourceAction => FacadeKind::ResourceAction,
        NodeKind::ActionRequest => FacadeKind::ActionRequest,
        NodeKind::ActionResponse => FacadeKind::ActionResponse,
        NodeKind::ParamGroup => FacadeKind::ParamGroup,
        NodeKind::Parameter => FacadeKind::Parameter,
    };
    Some(facade)
}
