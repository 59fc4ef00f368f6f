//! Services, blog posts and professionals.
//!
//! Public reads, admin writes. Updates are partial: absent fields keep their
//! stored value.

use crate::error::{CommerceError, Result};
use clientdesk_core::Money;
use clientdesk_core::catalog::{BlogPost, Professional, Service, slugify};
use clientdesk_core::environment::Clock;
use clientdesk_core::store::{Collection, Filter, new_id};
use clientdesk_core::validation::non_blank;
use serde::Deserialize;
use std::sync::Arc;

/// Body for creating or updating a service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInput {
    /// Display title.
    pub title: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Display price, e.g. `₹1,500`.
    pub price: Option<String>,
    /// Grouping label.
    pub category: Option<String>,
    /// Bullet points.
    pub features: Option<Vec<String>>,
    /// Fulfilment steps copied into purchase tasks.
    pub steps: Option<Vec<String>>,
    /// Listed publicly.
    pub active: Option<bool>,
}

/// Body for creating or updating a blog post.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogInput {
    /// Headline.
    pub title: Option<String>,
    /// URL slug; derived from the title when absent.
    pub slug: Option<String>,
    /// Teaser.
    pub excerpt: Option<String>,
    /// Body.
    pub content: Option<String>,
    /// Byline.
    pub author: Option<String>,
    /// Tags.
    pub tags: Option<Vec<String>>,
    /// Visible publicly.
    pub published: Option<bool>,
}

/// Body for creating or updating a team member.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalInput {
    /// Full name.
    pub name: Option<String>,
    /// Job title.
    pub role: Option<String>,
    /// Biography.
    pub bio: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Portrait URL.
    pub photo_url: Option<String>,
    /// Sort key.
    pub display_order: Option<i32>,
}

/// Catalog reference data.
#[derive(Clone)]
pub struct CatalogService {
    services: Arc<dyn Collection<Service>>,
    blogs: Arc<dyn Collection<BlogPost>>,
    people: Arc<dyn Collection<Professional>>,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    /// Create a catalog service.
    #[must_use]
    pub fn new(
        services: Arc<dyn Collection<Service>>,
        blogs: Arc<dyn Collection<BlogPost>>,
        people: Arc<dyn Collection<Professional>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            services,
            blogs,
            people,
            clock,
        }
    }

    // ------------------------------------------------------------------------
    // Services
    // ------------------------------------------------------------------------

    /// Services sorted by title; inactive ones only for admins.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Store`] on storage failures.
    pub async fn list_services(&self, include_inactive: bool) -> Result<Vec<Service>> {
        let filter = if include_inactive {
            Filter::new()
        } else {
            Filter::new().eq("active", true)
        };
        let mut services = self.services.find(&filter).await?;
        services.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(services)
    }

    /// One service.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotFound`] for an unknown id.
    pub async fn get_service(&self, id: &str) -> Result<Service> {
        self.services
            .get(id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Service", id))
    }

    /// Create a service.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Validation`] when the title or price is
    /// missing, or the price cannot be read.
    pub async fn create_service(&self, input: ServiceInput) -> Result<Service> {
        let title = required("title", input.title.as_deref())?;
        let price = required("price", input.price.as_deref())?;
        Money::parse_price(price)?;

        let now = self.clock.now();
        let service = Service {
            id: new_id(),
            title: title.to_string(),
            description: input.description.unwrap_or_default(),
            price: price.to_string(),
            category: non_blank(input.category.as_deref()).map(str::to_string),
            features: input.features.unwrap_or_default(),
            steps: input.steps.unwrap_or_default(),
            active: input.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        self.services.insert(&service).await?;
        tracing::info!(service_id = %service.id, title = %service.title, "Service created");
        Ok(service)
    }

    /// Update a service.
    ///
    /// # Errors
    ///
    /// - [`CommerceError::NotFound`] for an unknown id
    /// - [`CommerceError::Validation`] for a blank title or unreadable price
    pub async fn update_service(&self, id: &str, input: ServiceInput) -> Result<Service> {
        let mut service = self.get_service(id).await?;
        if let Some(title) = input.title.as_deref() {
            service.title = required("title", Some(title))?.to_string();
        }
        if let Some(price) = input.price.as_deref() {
            let price = required("price", Some(price))?;
            Money::parse_price(price)?;
            price.clone_into(&mut service.price);
        }
        if let Some(description) = input.description {
            service.description = description;
        }
        if let Some(category) = input.category {
            service.category = non_blank(Some(&category)).map(str::to_string);
        }
        if let Some(features) = input.features {
            service.features = features;
        }
        if let Some(steps) = input.steps {
            service.steps = steps;
        }
        if let Some(active) = input.active {
            service.active = active;
        }
        service.updated_at = self.clock.now();
        self.services.replace(&service).await?;
        Ok(service)
    }

    /// Delete a service.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotFound`] for an unknown id.
    pub async fn delete_service(&self, id: &str) -> Result<()> {
        if !self.services.delete(id).await? {
            return Err(CommerceError::not_found("Service", id));
        }
        tracing::info!(service_id = %id, "Service deleted");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Blog posts
    // ------------------------------------------------------------------------

    /// Posts, newest first; drafts only for admins.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Store`] on storage failures.
    pub async fn list_blogs(&self, include_drafts: bool) -> Result<Vec<BlogPost>> {
        let filter = if include_drafts {
            Filter::new()
        } else {
            Filter::new().eq("published", true)
        };
        let mut posts = self.blogs.find(&filter).await?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    /// One post by id or slug. Drafts are hidden from the public.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotFound`] when nothing visible matches.
    pub async fn get_blog(&self, id_or_slug: &str, include_drafts: bool) -> Result<BlogPost> {
        let post = match self.blogs.get(id_or_slug).await? {
            Some(post) => Some(post),
            None => self
                .blogs
                .find(&Filter::new().eq("slug", id_or_slug))
                .await?
                .into_iter()
                .next(),
        };
        post.filter(|p| include_drafts || p.published)
            .ok_or_else(|| CommerceError::not_found("Blog post", id_or_slug))
    }

    /// Create a post.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Validation`] when title, content or author is
    /// missing, or the slug is taken.
    pub async fn create_blog(&self, input: BlogInput) -> Result<BlogPost> {
        let title = required("title", input.title.as_deref())?;
        let content = required("content", input.content.as_deref())?;
        let author = required("author", input.author.as_deref())?;
        let slug = self
            .free_slug(non_blank(input.slug.as_deref()).unwrap_or(title), None)
            .await?;

        let now = self.clock.now();
        let post = BlogPost {
            id: new_id(),
            title: title.to_string(),
            slug,
            excerpt: non_blank(input.excerpt.as_deref()).map(str::to_string),
            content: content.to_string(),
            author: author.to_string(),
            tags: input.tags.unwrap_or_default(),
            published: input.published.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        self.blogs.insert(&post).await?;
        tracing::info!(post_id = %post.id, slug = %post.slug, "Blog post created");
        Ok(post)
    }

    /// Update a post.
    ///
    /// # Errors
    ///
    /// - [`CommerceError::NotFound`] for an unknown id
    /// - [`CommerceError::Validation`] for blank required fields or a taken slug
    pub async fn update_blog(&self, id: &str, input: BlogInput) -> Result<BlogPost> {
        let mut post = self
            .blogs
            .get(id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Blog post", id))?;

        if let Some(title) = input.title.as_deref() {
            post.title = required("title", Some(title))?.to_string();
        }
        if let Some(slug) = non_blank(input.slug.as_deref()) {
            post.slug = self.free_slug(slug, Some(id)).await?;
        }
        if let Some(content) = input.content.as_deref() {
            post.content = required("content", Some(content))?.to_string();
        }
        if let Some(author) = input.author.as_deref() {
            post.author = required("author", Some(author))?.to_string();
        }
        if let Some(excerpt) = input.excerpt {
            post.excerpt = non_blank(Some(&excerpt)).map(str::to_string);
        }
        if let Some(tags) = input.tags {
            post.tags = tags;
        }
        if let Some(published) = input.published {
            post.published = published;
        }
        post.updated_at = self.clock.now();
        self.blogs.replace(&post).await?;
        Ok(post)
    }

    /// Delete a post.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotFound`] for an unknown id.
    pub async fn delete_blog(&self, id: &str) -> Result<()> {
        if !self.blogs.delete(id).await? {
            return Err(CommerceError::not_found("Blog post", id));
        }
        Ok(())
    }

    async fn free_slug(&self, source: &str, own_id: Option<&str>) -> Result<String> {
        let slug = slugify(source);
        if slug.is_empty() {
            return Err(CommerceError::validation("slug must contain letters or digits"));
        }
        let taken = self
            .blogs
            .find(&Filter::new().eq("slug", slug.as_str()))
            .await?
            .iter()
            .any(|p| Some(p.id.as_str()) != own_id);
        if taken {
            return Err(CommerceError::Validation(format!("slug '{slug}' is already in use")));
        }
        Ok(slug)
    }

    // ------------------------------------------------------------------------
    // Professionals
    // ------------------------------------------------------------------------

    /// Team members in display order.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Store`] on storage failures.
    pub async fn list_people(&self) -> Result<Vec<Professional>> {
        let mut people = self.people.find(&Filter::new()).await?;
        people.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(people)
    }

    /// One team member.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotFound`] for an unknown id.
    pub async fn get_person(&self, id: &str) -> Result<Professional> {
        self.people
            .get(id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Professional", id))
    }

    /// Add a team member.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Validation`] when the name is missing.
    pub async fn create_person(&self, input: ProfessionalInput) -> Result<Professional> {
        let name = required("name", input.name.as_deref())?;
        let now = self.clock.now();
        let person = Professional {
            id: new_id(),
            name: name.to_string(),
            role: input.role.unwrap_or_default(),
            bio: input.bio.unwrap_or_default(),
            email: non_blank(input.email.as_deref()).map(str::to_string),
            photo_url: non_blank(input.photo_url.as_deref()).map(str::to_string),
            display_order: input.display_order.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        self.people.insert(&person).await?;
        Ok(person)
    }

    /// Update a team member.
    ///
    /// # Errors
    ///
    /// - [`CommerceError::NotFound`] for an unknown id
    /// - [`CommerceError::Validation`] for a blank name
    pub async fn update_person(&self, id: &str, input: ProfessionalInput) -> Result<Professional> {
        let mut person = self.get_person(id).await?;
        if let Some(name) = input.name.as_deref() {
            person.name = required("name", Some(name))?.to_string();
        }
        if let Some(role) = input.role {
            person.role = role;
        }
        if let Some(bio) = input.bio {
            person.bio = bio;
        }
        if let Some(email) = input.email {
            person.email = non_blank(Some(&email)).map(str::to_string);
        }
        if let Some(photo_url) = input.photo_url {
            person.photo_url = non_blank(Some(&photo_url)).map(str::to_string);
        }
        if let Some(order) = input.display_order {
            person.display_order = order;
        }
        person.updated_at = self.clock.now();
        self.people.replace(&person).await?;
        Ok(person)
    }

    /// Remove a team member.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotFound`] for an unknown id.
    pub async fn delete_person(&self, id: &str) -> Result<()> {
        if !self.people.delete(id).await? {
            return Err(CommerceError::not_found("Professional", id));
        }
        Ok(())
    }
}

pub(crate) fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    non_blank(value).ok_or_else(|| CommerceError::Validation(format!("{field} is required")))
}
